use bevy_math::Mat4;
use bytemuck::Pod;
use bytemuck::Zeroable;
use windows::Win32::Graphics::Direct3D11::*;

use crate::asset::ShaderBytecode;
use crate::error::MyResult;
use crate::model::PositionNormalUv;
use crate::shader_manager::create_input_layout;
use crate::shader_manager::create_pixel_shader;
use crate::shader_manager::create_vertex_shader;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MatrixBuffer {
    world: [f32; 16],
    view: [f32; 16],
    projection: [f32; 16],
}

/// Draws [`PositionNormalUv`] geometry with a vertex/pixel shader pair that
/// reads world, view and projection from constant buffer slot 0.
pub struct ColorShader {
    vertex_shader: ID3D11VertexShader,
    pixel_shader: ID3D11PixelShader,
    input_layout: ID3D11InputLayout,
    matrix_buffer: ID3D11Buffer,
}

impl ColorShader {
    pub fn new(device: &ID3D11Device, vs: &ShaderBytecode, ps: &ShaderBytecode) -> MyResult<Self> {
        let vertex_shader = create_vertex_shader(device, vs.as_bytes())?;
        let pixel_shader = create_pixel_shader(device, ps.as_bytes())?;
        let input_layout = create_input_layout::<PositionNormalUv>(device, vs.as_bytes())?;

        let desc = D3D11_BUFFER_DESC {
            ByteWidth: std::mem::size_of::<MatrixBuffer>() as u32,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            ..Default::default()
        };
        let mut matrix_buffer = None;
        unsafe { device.CreateBuffer(&desc, None, Some(&mut matrix_buffer))? };
        let matrix_buffer =
            matrix_buffer.ok_or_else(|| eyre::eyre!("matrix buffer creation returned nothing"))?;

        Ok(Self {
            vertex_shader,
            pixel_shader,
            input_layout,
            matrix_buffer,
        })
    }

    pub fn render(
        &self,
        context: &ID3D11DeviceContext,
        world: Mat4,
        view: Mat4,
        projection: Mat4,
    ) -> MyResult<()> {
        let matrices = MatrixBuffer {
            world: world.to_cols_array(),
            view: view.to_cols_array(),
            projection: projection.to_cols_array(),
        };

        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe {
            context.Map(&self.matrix_buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))?;
            std::ptr::copy_nonoverlapping(&matrices, mapped.pData as *mut MatrixBuffer, 1);
            context.Unmap(&self.matrix_buffer, 0);

            context.VSSetConstantBuffers(0, Some(&[Some(self.matrix_buffer.clone())]));
            context.IASetInputLayout(&self.input_layout);
            context.VSSetShader(&self.vertex_shader, None);
            context.PSSetShader(&self.pixel_shader, None);
        }
        Ok(())
    }
}
