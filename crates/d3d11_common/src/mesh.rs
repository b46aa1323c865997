use std::marker::PhantomData;

use bytemuck::Pod;
use tracing::debug;
use windows::Win32::Graphics::Direct3D::D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R16_UINT;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_R32_UINT;

use crate::error::MyResult;
use crate::geometry::colored_cube_vertices;
use crate::geometry::normal_uv_cube_vertices;
use crate::geometry::VertexLayout;
use crate::geometry::VertexNormalUv;
use crate::geometry::VertexPositionColor;
use crate::geometry::CUBE_INDICES;
use crate::model::MeshData;
use crate::model::ModelData;
use crate::model::PositionNormalUv;

/// Creates a default usage buffer initialized with `data`.
pub fn create_buffer<T: Pod>(
    device: &ID3D11Device,
    data: &[T],
    bind_flag: D3D11_BIND_FLAG,
) -> MyResult<ID3D11Buffer> {
    let bytes: &[u8] = bytemuck::cast_slice(data);
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: bytes.len() as u32,
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: bind_flag.0 as u32,
        ..Default::default()
    };
    let initial_data = D3D11_SUBRESOURCE_DATA {
        pSysMem: bytes.as_ptr() as *const _,
        ..Default::default()
    };
    let mut buffer = None;
    unsafe { device.CreateBuffer(&desc, Some(&initial_data), Some(&mut buffer))? };
    Ok(buffer.ok_or_else(|| eyre::eyre!("buffer creation returned nothing"))?)
}

fn draw_indexed(
    context: &ID3D11DeviceContext,
    vertex_buffer: &ID3D11Buffer,
    stride: u32,
    index_buffer: &ID3D11Buffer,
    index_format: DXGI_FORMAT,
    index_count: u32,
) {
    let offset = 0;
    unsafe {
        context.IASetVertexBuffers(
            0,
            1,
            Some(&Some(vertex_buffer.clone())),
            Some(&stride),
            Some(&offset),
        );
        context.IASetIndexBuffer(index_buffer, index_format, 0);
        context.IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
        context.DrawIndexed(index_count, 0, 0);
    }
}

/// Vertex formats the fixed cube can be built in.
pub trait CubeVertex: VertexLayout {
    fn cube_vertices() -> [Self; 8];
}

impl CubeVertex for VertexPositionColor {
    fn cube_vertices() -> [Self; 8] {
        colored_cube_vertices()
    }
}

impl CubeVertex for VertexNormalUv {
    fn cube_vertices() -> [Self; 8] {
        normal_uv_cube_vertices()
    }
}

pub struct CubeMesh<V> {
    vertex_buffer: ID3D11Buffer,
    index_buffer: ID3D11Buffer,
    _vertex: PhantomData<V>,
}

impl<V: CubeVertex> CubeMesh<V> {
    pub fn new(device: &ID3D11Device) -> MyResult<Self> {
        Ok(Self {
            vertex_buffer: create_buffer(device, &V::cube_vertices(), D3D11_BIND_VERTEX_BUFFER)?,
            index_buffer: create_buffer(device, &CUBE_INDICES, D3D11_BIND_INDEX_BUFFER)?,
            _vertex: PhantomData,
        })
    }

    pub fn draw(&self, context: &ID3D11DeviceContext) {
        draw_indexed(
            context,
            &self.vertex_buffer,
            V::stride(),
            &self.index_buffer,
            DXGI_FORMAT_R16_UINT,
            CUBE_INDICES.len() as u32,
        );
    }
}

/// GPU copy of one imported mesh.
pub struct Mesh {
    name: String,
    vertex_buffer: ID3D11Buffer,
    index_buffer: ID3D11Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn from_data(device: &ID3D11Device, data: &MeshData) -> MyResult<Self> {
        data.validate()?;
        Ok(Self {
            name: data.name.clone(),
            vertex_buffer: create_buffer(device, &data.vertices, D3D11_BIND_VERTEX_BUFFER)?,
            index_buffer: create_buffer(device, &data.indices, D3D11_BIND_INDEX_BUFFER)?,
            index_count: data.index_count() as u32,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn render(&self, context: &ID3D11DeviceContext) {
        draw_indexed(
            context,
            &self.vertex_buffer,
            PositionNormalUv::stride(),
            &self.index_buffer,
            DXGI_FORMAT_R32_UINT,
            self.index_count,
        );
    }
}

pub struct Model {
    meshes: Vec<Mesh>,
}

impl Model {
    pub fn from_data(device: &ID3D11Device, data: &ModelData) -> MyResult<Self> {
        let meshes = data
            .meshes()
            .iter()
            .map(|mesh| Mesh::from_data(device, mesh))
            .collect::<MyResult<Vec<_>>>()?;
        debug!("Uploaded {} meshes", meshes.len());
        Ok(Self { meshes })
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn render(&self, context: &ID3D11DeviceContext) {
        for mesh in &self.meshes {
            mesh.render(context);
        }
    }
}
