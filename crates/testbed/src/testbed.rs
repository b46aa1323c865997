use std::path::Path;

use bevy_math::Mat4;
use bevy_math::Vec3;
use d3d11_common::asset::AssetManager;
use d3d11_common::command_line::SampleCommandLine;
use d3d11_common::dx_sample::Sample;
use d3d11_common::error::AssetError;
use d3d11_common::error::MyResult;
use d3d11_common::geometry::VertexPositionColor;
use d3d11_common::mesh::CubeMesh;
use d3d11_common::model::ObjImporter;
use d3d11_common::render_device::RenderDevice;
use d3d11_common::shader_compiler::FxcCompiler;
use d3d11_common::shader_manager::ShaderManager;
use d3d11_common::shader_model::ShaderStage;
use d3d11_common::CORNFLOWER_BLUE;
use tracing::info;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;

const VERTEX_SHADER: &str = "data/shaders/SimpleVertexShader.hlsl";
const PIXEL_SHADER: &str = "data/shaders/SimplePixelShader.hlsl";
const DEGREES_PER_SECOND: f32 = 90.0;

/// Fields drop in order, and the device reports live objects when it goes.
struct Graphics {
    shaders: ShaderManager,
    cube: CubeMesh<VertexPositionColor>,
    device: RenderDevice,
}

/// A colored cube spinning about the (0, 1, 1) axis.
pub struct Testbed {
    command_line: SampleCommandLine,
    assets: AssetManager<ObjImporter, FxcCompiler>,
    graphics: Option<Graphics>,
    angle_degrees: f32,
}

impl Sample for Testbed {
    const CLASS_NAME: PCWSTR = w!("DirectXWindowClass");

    fn new(command_line: &SampleCommandLine) -> MyResult<Self> {
        let mut assets = AssetManager::new(ObjImporter, FxcCompiler)?;
        assets.add_existing_paths(&command_line.asset_paths);
        assets.add_existing_paths([Path::new("."), Path::new(env!("CARGO_MANIFEST_DIR"))]);

        Ok(Self {
            command_line: command_line.clone(),
            assets,
            graphics: None,
            angle_degrees: 0.0,
        })
    }

    fn bind_to_window(&mut self, hwnd: HWND) -> MyResult<()> {
        let device = RenderDevice::new(hwnd, &self.command_line)?;
        let mut shaders = ShaderManager::new(&device, FxcCompiler)?;

        let shader_model = device.shader_model();
        let vs_profile = shader_model
            .profile(ShaderStage::Vertex)
            .ok_or(AssetError::UnsupportedShaderModel {
                stage: ShaderStage::Vertex,
            })?;
        let ps_profile = shader_model
            .profile(ShaderStage::Pixel)
            .ok_or(AssetError::UnsupportedShaderModel {
                stage: ShaderStage::Pixel,
            })?;

        let vertex_shader = self
            .assets
            .load_shader(VERTEX_SHADER, vs_profile, "SimpleVertexShader")?;
        shaders.load_vs_bytecode::<VertexPositionColor>(vertex_shader)?;
        let pixel_shader = self
            .assets
            .load_shader(PIXEL_SHADER, ps_profile, "SimplePixelShader")?;
        shaders.load_ps_bytecode(pixel_shader)?;

        let cube = CubeMesh::new(device.device())?;
        shaders.update_projection(device.context(), device.aspect_ratio());

        info!("Testbed ready");
        self.graphics = Some(Graphics {
            device,
            shaders,
            cube,
        });
        Ok(())
    }

    fn update(&mut self, delta: f32) {
        self.angle_degrees = (self.angle_degrees + DEGREES_PER_SECOND * delta) % 360.0;
    }

    fn render(&mut self) -> MyResult<()> {
        let Some(graphics) = &self.graphics else {
            return Ok(());
        };
        let context = graphics.device.context();

        let view = Mat4::look_at_lh(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y);
        let axis = Vec3::new(0.0, 1.0, 1.0).normalize();
        let world = Mat4::from_axis_angle(axis, self.angle_degrees.to_radians());
        graphics.shaders.update_view(context, view);
        graphics.shaders.update_world(context, world);

        graphics.device.clear(CORNFLOWER_BLUE, 1.0, 0);
        graphics.device.bind_targets();
        graphics.shaders.bind(context);
        graphics.cube.draw(context);
        graphics.device.present()
    }

    fn on_resize(&mut self, width: u32, height: u32) -> MyResult<()> {
        if let Some(graphics) = &mut self.graphics {
            graphics.device.resize(width, height)?;
            graphics
                .shaders
                .update_projection(graphics.device.context(), graphics.device.aspect_ratio());
        }
        Ok(())
    }

    fn on_destroy(&mut self) {
        info!(
            "Testbed shutting down after loading {} shaders",
            self.assets.shader_count()
        );
        self.graphics = None;
    }

    fn title(&self) -> String {
        "DirectX Template".into()
    }

    fn window_size(&self) -> (i32, i32) {
        (1280, 720)
    }
}
