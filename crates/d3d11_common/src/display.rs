#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub numerator: u32,
    pub denominator: u32,
}

/// Refresh rate for a swap chain of the given size, as numerator and
/// denominator. Without vsync the rate is left to the system.
pub fn select_refresh_rate(
    modes: &[DisplayMode],
    width: u32,
    height: u32,
    vsync: bool,
) -> (u32, u32) {
    if !vsync {
        return (0, 1);
    }
    modes
        .iter()
        .rev()
        .find(|mode| mode.width == width && mode.height == height)
        .map_or((0, 1), |mode| (mode.numerator, mode.denominator))
}

/// Display modes of the primary output of the first adapter.
#[cfg(windows)]
pub fn query_display_modes() -> crate::error::MyResult<Vec<DisplayMode>> {
    use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_B8G8R8A8_UNORM;
    use windows::Win32::Graphics::Dxgi::Common::DXGI_MODE_DESC;
    use windows::Win32::Graphics::Dxgi::CreateDXGIFactory1;
    use windows::Win32::Graphics::Dxgi::IDXGIFactory1;

    let factory: IDXGIFactory1 = unsafe { CreateDXGIFactory1()? };
    let adapter = unsafe { factory.EnumAdapters1(0)? };
    let output = unsafe { adapter.EnumOutputs(0)? };

    let mut count = 0;
    unsafe {
        output.GetDisplayModeList(
            DXGI_FORMAT_B8G8R8A8_UNORM,
            Default::default(),
            &mut count,
            None,
        )?;
    }
    let mut descs = vec![DXGI_MODE_DESC::default(); count as usize];
    unsafe {
        output.GetDisplayModeList(
            DXGI_FORMAT_B8G8R8A8_UNORM,
            Default::default(),
            &mut count,
            Some(descs.as_mut_ptr()),
        )?;
    }
    descs.truncate(count as usize);

    Ok(descs
        .iter()
        .map(|desc| DisplayMode {
            width: desc.Width,
            height: desc.Height,
            numerator: desc.RefreshRate.Numerator,
            denominator: desc.RefreshRate.Denominator,
        })
        .collect())
}
