use std::mem::ManuallyDrop;

use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::core::Interface;
use windows::Win32::Foundation::E_INVALIDARG;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Foundation::HWND;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::IDXGISwapChain;
use windows::Win32::Graphics::Dxgi::DXGI_ERROR_SDK_COMPONENT_MISSING;
use windows::Win32::Graphics::Dxgi::DXGI_SWAP_CHAIN_DESC;
use windows::Win32::Graphics::Dxgi::DXGI_SWAP_EFFECT_DISCARD;
use windows::Win32::Graphics::Dxgi::DXGI_USAGE_RENDER_TARGET_OUTPUT;
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;

use crate::command_line::SampleCommandLine;
use crate::display::query_display_modes;
use crate::display::select_refresh_rate;
use crate::error::MyResult;
use crate::shader_model::ShaderModel;

const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 7] = [
    D3D_FEATURE_LEVEL_11_1,
    D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_10_1,
    D3D_FEATURE_LEVEL_10_0,
    D3D_FEATURE_LEVEL_9_3,
    D3D_FEATURE_LEVEL_9_2,
    D3D_FEATURE_LEVEL_9_1,
];

struct CreatedDevice {
    swap_chain: IDXGISwapChain,
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    feature_level: D3D_FEATURE_LEVEL,
}

/// Device, immediate context and swap chain for one window, plus the
/// back buffer, depth buffer and fixed pipeline state every sample shares.
///
/// Everything created from the device is released in `Drop` before live
/// objects are reported, so owners should drop their own buffers and
/// shaders before this.
pub struct RenderDevice {
    device: ID3D11Device,
    context: ManuallyDrop<ID3D11DeviceContext>,
    swap_chain: ManuallyDrop<IDXGISwapChain>,
    render_target_view: Option<ID3D11RenderTargetView>,
    depth_stencil_view: Option<ID3D11DepthStencilView>,
    depth_stencil_state: ManuallyDrop<ID3D11DepthStencilState>,
    rasterizer_state: ManuallyDrop<ID3D11RasterizerState>,
    viewport: D3D11_VIEWPORT,
    feature_level: D3D_FEATURE_LEVEL,
    client_size: (u32, u32),
    vsync: bool,
}

impl RenderDevice {
    pub fn new(hwnd: HWND, command_line: &SampleCommandLine) -> MyResult<Self> {
        let mut client_rect = RECT::default();
        unsafe { GetClientRect(hwnd, &mut client_rect)? };
        let width = (client_rect.right - client_rect.left).max(1) as u32;
        let height = (client_rect.bottom - client_rect.top).max(1) as u32;

        let modes = if command_line.vsync {
            query_display_modes().unwrap_or_else(|e| {
                warn!("Could not enumerate display modes: {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };
        let (numerator, denominator) =
            select_refresh_rate(&modes, width, height, command_line.vsync);
        debug!("Swap chain refresh rate {numerator}/{denominator}");

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: width,
                Height: height,
                RefreshRate: DXGI_RATIONAL {
                    Numerator: numerator,
                    Denominator: denominator,
                },
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ..Default::default()
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: 1,
            OutputWindow: hwnd,
            Windowed: true.into(),
            SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
            ..Default::default()
        };

        let driver_type = if command_line.use_warp_device {
            info!("Using WARP device.");
            D3D_DRIVER_TYPE_WARP
        } else {
            D3D_DRIVER_TYPE_HARDWARE
        };

        let debug_layer = cfg!(debug_assertions);
        let created = match create_device(driver_type, debug_layer, &swap_chain_desc) {
            Err(e) if debug_layer && e.code() == DXGI_ERROR_SDK_COMPONENT_MISSING => {
                warn!("Direct3D debug layer unavailable, continuing without it.");
                create_device(driver_type, false, &swap_chain_desc)?
            }
            other => other?,
        };
        info!(
            "Created Direct3D 11 device with feature level {:#x}",
            created.feature_level.0
        );

        let CreatedDevice {
            swap_chain,
            device,
            context,
            feature_level,
        } = created;

        let depth_stencil_desc = D3D11_DEPTH_STENCIL_DESC {
            DepthEnable: true.into(),
            DepthWriteMask: D3D11_DEPTH_WRITE_MASK_ALL,
            DepthFunc: D3D11_COMPARISON_LESS,
            StencilEnable: false.into(),
            ..Default::default()
        };
        let mut depth_stencil_state = None;
        unsafe {
            device.CreateDepthStencilState(&depth_stencil_desc, Some(&mut depth_stencil_state))?
        };

        let rasterizer_desc = D3D11_RASTERIZER_DESC {
            FillMode: D3D11_FILL_SOLID,
            CullMode: D3D11_CULL_BACK,
            FrontCounterClockwise: false.into(),
            DepthClipEnable: true.into(),
            ..Default::default()
        };
        let mut rasterizer_state = None;
        unsafe { device.CreateRasterizerState(&rasterizer_desc, Some(&mut rasterizer_state))? };

        let (Some(depth_stencil_state), Some(rasterizer_state)) =
            (depth_stencil_state, rasterizer_state)
        else {
            return Err(eyre::eyre!("pipeline state creation returned nothing").into());
        };

        let mut render_device = Self {
            device,
            context: ManuallyDrop::new(context),
            swap_chain: ManuallyDrop::new(swap_chain),
            render_target_view: None,
            depth_stencil_view: None,
            depth_stencil_state: ManuallyDrop::new(depth_stencil_state),
            rasterizer_state: ManuallyDrop::new(rasterizer_state),
            viewport: D3D11_VIEWPORT::default(),
            feature_level,
            client_size: (width, height),
            vsync: command_line.vsync,
        };
        render_device.create_size_dependent_resources(width, height)?;
        Ok(render_device)
    }

    fn create_size_dependent_resources(&mut self, width: u32, height: u32) -> MyResult<()> {
        let back_buffer: ID3D11Texture2D = unsafe { self.swap_chain.GetBuffer(0)? };
        let mut render_target_view = None;
        unsafe {
            self.device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut render_target_view))?
        };

        let depth_desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
            ..Default::default()
        };
        let mut depth_buffer = None;
        unsafe { self.device.CreateTexture2D(&depth_desc, None, Some(&mut depth_buffer))? };
        let depth_buffer =
            depth_buffer.ok_or_else(|| eyre::eyre!("depth buffer creation returned nothing"))?;

        let mut depth_stencil_view = None;
        unsafe {
            self.device
                .CreateDepthStencilView(&depth_buffer, None, Some(&mut depth_stencil_view))?
        };

        self.render_target_view = render_target_view;
        self.depth_stencil_view = depth_stencil_view;
        self.viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: width as f32,
            Height: height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        self.client_size = (width, height);
        Ok(())
    }

    pub fn clear(&self, color: [f32; 4], depth: f32, stencil: u8) {
        unsafe {
            if let Some(render_target_view) = &self.render_target_view {
                self.context.ClearRenderTargetView(render_target_view, &color);
            }
            if let Some(depth_stencil_view) = &self.depth_stencil_view {
                self.context.ClearDepthStencilView(
                    depth_stencil_view,
                    (D3D11_CLEAR_DEPTH.0 | D3D11_CLEAR_STENCIL.0) as u32,
                    depth,
                    stencil,
                );
            }
        }
    }

    pub fn bind_targets(&self) {
        unsafe {
            self.context.OMSetRenderTargets(
                Some(&[self.render_target_view.clone()]),
                self.depth_stencil_view.as_ref(),
            );
            self.context.OMSetDepthStencilState(&*self.depth_stencil_state, 1);
            self.context.RSSetState(&*self.rasterizer_state);
            self.context.RSSetViewports(Some(&[self.viewport]));
        }
    }

    pub fn present(&self) -> MyResult<()> {
        let sync_interval = if self.vsync { 1 } else { 0 };
        unsafe { self.swap_chain.Present(sync_interval, Default::default()).ok()? };
        Ok(())
    }

    /// Resizes the swap chain to a new client size. Minimizing reports a zero
    /// size, which is ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> MyResult<()> {
        if width == 0 || height == 0 || (width, height) == self.client_size {
            return Ok(());
        }
        debug!("Resizing swap chain to {width}x{height}");

        unsafe { self.context.OMSetRenderTargets(None, None) };
        self.render_target_view = None;
        self.depth_stencil_view = None;

        unsafe {
            self.swap_chain
                .ResizeBuffers(0, width, height, DXGI_FORMAT_UNKNOWN, Default::default())?
        };
        self.create_size_dependent_resources(width, height)
    }

    pub fn device(&self) -> &ID3D11Device {
        &self.device
    }

    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.context
    }

    pub fn feature_level(&self) -> D3D_FEATURE_LEVEL {
        self.feature_level
    }

    pub fn shader_model(&self) -> ShaderModel {
        ShaderModel::from_feature_level_code(self.feature_level.0 as u32)
    }

    pub fn client_size(&self) -> (u32, u32) {
        self.client_size
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.client_size;
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

impl Drop for RenderDevice {
    fn drop(&mut self) {
        unsafe {
            self.context.ClearState();
            self.context.Flush();
        }
        self.render_target_view = None;
        self.depth_stencil_view = None;
        // Fields are never touched again after this point.
        unsafe {
            ManuallyDrop::drop(&mut self.rasterizer_state);
            ManuallyDrop::drop(&mut self.depth_stencil_state);
            ManuallyDrop::drop(&mut self.swap_chain);
            ManuallyDrop::drop(&mut self.context);
        }

        if cfg!(debug_assertions) {
            if let Ok(debug) = self.device.cast::<ID3D11Debug>() {
                let flags = D3D11_RLDO_DETAIL | D3D11_RLDO_IGNORE_INTERNAL;
                if let Err(e) = unsafe { debug.ReportLiveDeviceObjects(flags) } {
                    warn!("Could not report live device objects: {e}");
                }
            }
        }
    }
}

fn device_flags(debug_layer: bool) -> D3D11_CREATE_DEVICE_FLAG {
    if debug_layer {
        D3D11_CREATE_DEVICE_DEBUG
    } else {
        D3D11_CREATE_DEVICE_FLAG(0)
    }
}

/// Runtimes older than 11.1 reject the 11_1 level outright, so that case
/// is retried with the remaining levels.
fn create_device(
    driver_type: D3D_DRIVER_TYPE,
    debug_layer: bool,
    swap_chain_desc: &DXGI_SWAP_CHAIN_DESC,
) -> windows::core::Result<CreatedDevice> {
    match create_device_with_levels(driver_type, debug_layer, &FEATURE_LEVELS, swap_chain_desc) {
        Err(e) if e.code() == E_INVALIDARG => {
            debug!("Feature level 11_1 rejected, retrying without it.");
            create_device_with_levels(
                driver_type,
                debug_layer,
                &FEATURE_LEVELS[1..],
                swap_chain_desc,
            )
        }
        other => other,
    }
}

fn create_device_with_levels(
    driver_type: D3D_DRIVER_TYPE,
    debug_layer: bool,
    feature_levels: &[D3D_FEATURE_LEVEL],
    swap_chain_desc: &DXGI_SWAP_CHAIN_DESC,
) -> windows::core::Result<CreatedDevice> {
    let mut swap_chain = None;
    let mut device = None;
    let mut context = None;
    let mut feature_level = D3D_FEATURE_LEVEL::default();
    unsafe {
        D3D11CreateDeviceAndSwapChain(
            None,
            driver_type,
            HMODULE::default(),
            device_flags(debug_layer),
            Some(feature_levels),
            D3D11_SDK_VERSION,
            Some(swap_chain_desc),
            Some(&mut swap_chain),
            Some(&mut device),
            Some(&mut feature_level),
            Some(&mut context),
        )?;
    }
    match (swap_chain, device, context) {
        (Some(swap_chain), Some(device), Some(context)) => Ok(CreatedDevice {
            swap_chain,
            device,
            context,
            feature_level,
        }),
        _ => Err(windows::core::Error::from(windows::Win32::Foundation::E_POINTER)),
    }
}
