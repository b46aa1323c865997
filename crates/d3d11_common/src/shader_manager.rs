use std::path::Path;

use bevy_math::Mat4;
use tracing::info;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R32G32B32A32_FLOAT;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R32G32B32_FLOAT;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R32G32_FLOAT;

use crate::asset::ResourceLoader;
use crate::asset::ShaderBytecode;
use crate::asset::ShaderOptions;
use crate::camera::DEFAULT_FAR;
use crate::camera::DEFAULT_FOV_DEGREES;
use crate::camera::DEFAULT_NEAR;
use crate::error::AssetError;
use crate::error::MyResult;
use crate::geometry::ElementFormat;
use crate::geometry::VertexLayout;
use crate::render_device::RenderDevice;
use crate::shader_compiler::FxcCompiler;
use crate::shader_model::ShaderModel;
use crate::shader_model::ShaderStage;

/// Constant buffer slots, bound to the vertex shader in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantBuffer {
    /// Projection, rewritten on resize.
    Application = 0,
    /// View, rewritten every frame.
    Frame = 1,
    /// World, rewritten per object.
    Object = 2,
}

const NUM_CONSTANT_BUFFERS: usize = 3;

fn dxgi_format(format: ElementFormat) -> DXGI_FORMAT {
    match format {
        ElementFormat::Float2 => DXGI_FORMAT_R32G32_FLOAT,
        ElementFormat::Float3 => DXGI_FORMAT_R32G32B32_FLOAT,
        ElementFormat::Float4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
    }
}

/// Input layout for `V`, validated against the vertex shader's signature.
pub fn create_input_layout<V: VertexLayout>(
    device: &ID3D11Device,
    vertex_shader_bytecode: &[u8],
) -> MyResult<ID3D11InputLayout> {
    let elements: Vec<D3D11_INPUT_ELEMENT_DESC> = V::ELEMENTS
        .iter()
        .map(|element| D3D11_INPUT_ELEMENT_DESC {
            SemanticName: PCSTR(element.semantic.as_ptr() as *const u8),
            SemanticIndex: 0,
            Format: dxgi_format(element.format),
            InputSlot: 0,
            AlignedByteOffset: element.offset,
            InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        })
        .collect();

    let mut input_layout = None;
    unsafe {
        device.CreateInputLayout(&elements, vertex_shader_bytecode, Some(&mut input_layout))?
    };
    Ok(input_layout.ok_or_else(|| eyre::eyre!("input layout creation returned nothing"))?)
}

pub fn create_vertex_shader(
    device: &ID3D11Device,
    bytecode: &[u8],
) -> MyResult<ID3D11VertexShader> {
    let mut shader = None;
    unsafe { device.CreateVertexShader(bytecode, None, Some(&mut shader))? };
    Ok(shader.ok_or_else(|| eyre::eyre!("vertex shader creation returned nothing"))?)
}

pub fn create_pixel_shader(device: &ID3D11Device, bytecode: &[u8]) -> MyResult<ID3D11PixelShader> {
    let mut shader = None;
    unsafe { device.CreatePixelShader(bytecode, None, Some(&mut shader))? };
    Ok(shader.ok_or_else(|| eyre::eyre!("pixel shader creation returned nothing"))?)
}

fn create_matrix_buffer(device: &ID3D11Device) -> MyResult<ID3D11Buffer> {
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: std::mem::size_of::<[f32; 16]>() as u32,
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
        ..Default::default()
    };
    let mut buffer = None;
    unsafe { device.CreateBuffer(&desc, None, Some(&mut buffer))? };
    Ok(buffer.ok_or_else(|| eyre::eyre!("constant buffer creation returned nothing"))?)
}

/// Owns one vertex/pixel shader pair with its input layout and the
/// projection, view and world matrices they read.
pub struct ShaderManager<C = FxcCompiler> {
    device: ID3D11Device,
    compiler: C,
    shader_model: ShaderModel,
    constant_buffers: [ID3D11Buffer; NUM_CONSTANT_BUFFERS],
    vertex_shader: Option<ID3D11VertexShader>,
    input_layout: Option<ID3D11InputLayout>,
    pixel_shader: Option<ID3D11PixelShader>,
}

impl<C> ShaderManager<C>
where
    C: ResourceLoader<Resource = ShaderBytecode, Options = ShaderOptions>,
{
    pub fn new(render_device: &RenderDevice, compiler: C) -> MyResult<Self> {
        let device = render_device.device().clone();
        let shader_model = render_device.shader_model();
        info!("Shader model {shader_model:?}");
        let constant_buffers = array_init::try_array_init(|_| create_matrix_buffer(&device))?;
        Ok(Self {
            device,
            compiler,
            shader_model,
            constant_buffers,
            vertex_shader: None,
            input_layout: None,
            pixel_shader: None,
        })
    }

    pub fn shader_model(&self) -> ShaderModel {
        self.shader_model
    }

    fn profile(&self, stage: ShaderStage) -> MyResult<&'static str> {
        Ok(self
            .shader_model
            .profile(stage)
            .ok_or(AssetError::UnsupportedShaderModel { stage })?)
    }

    pub fn load_vs_from_file<V: VertexLayout>(
        &mut self,
        path: &Path,
        entry_point: &str,
    ) -> MyResult<()> {
        let profile = self.profile(ShaderStage::Vertex)?;
        let bytecode = self.compiler.load(path, &ShaderOptions::new(profile, entry_point))?;
        self.load_vs_bytecode::<V>(&bytecode)
    }

    pub fn load_ps_from_file(&mut self, path: &Path, entry_point: &str) -> MyResult<()> {
        let profile = self.profile(ShaderStage::Pixel)?;
        let bytecode = self.compiler.load(path, &ShaderOptions::new(profile, entry_point))?;
        self.load_ps_bytecode(&bytecode)
    }

    pub fn load_vs_bytecode<V: VertexLayout>(&mut self, bytecode: &ShaderBytecode) -> MyResult<()> {
        self.vertex_shader = Some(create_vertex_shader(&self.device, bytecode.as_bytes())?);
        self.input_layout = Some(create_input_layout::<V>(&self.device, bytecode.as_bytes())?);
        info!("Vertex shader {} ready", bytecode.name);
        Ok(())
    }

    pub fn load_ps_bytecode(&mut self, bytecode: &ShaderBytecode) -> MyResult<()> {
        self.pixel_shader = Some(create_pixel_shader(&self.device, bytecode.as_bytes())?);
        info!("Pixel shader {} ready", bytecode.name);
        Ok(())
    }

    fn write_matrix(&self, context: &ID3D11DeviceContext, slot: ConstantBuffer, matrix: Mat4) {
        let columns = matrix.to_cols_array();
        unsafe {
            context.UpdateSubresource(
                &self.constant_buffers[slot as usize],
                0,
                None,
                columns.as_ptr() as *const _,
                0,
                0,
            );
        }
    }

    pub fn update_projection(&self, context: &ID3D11DeviceContext, aspect_ratio: f32) {
        let projection = Mat4::perspective_lh(
            DEFAULT_FOV_DEGREES.to_radians(),
            aspect_ratio,
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        self.write_matrix(context, ConstantBuffer::Application, projection);
    }

    pub fn update_view(&self, context: &ID3D11DeviceContext, view: Mat4) {
        self.write_matrix(context, ConstantBuffer::Frame, view);
    }

    pub fn update_world(&self, context: &ID3D11DeviceContext, world: Mat4) {
        self.write_matrix(context, ConstantBuffer::Object, world);
    }

    pub fn bind(&self, context: &ID3D11DeviceContext) {
        let constant_buffers = self.constant_buffers.clone().map(Some);
        unsafe {
            context.IASetInputLayout(self.input_layout.as_ref());
            context.VSSetShader(self.vertex_shader.as_ref(), None);
            context.VSSetConstantBuffers(0, Some(&constant_buffers));
            context.PSSetShader(self.pixel_shader.as_ref(), None);
        }
    }
}
