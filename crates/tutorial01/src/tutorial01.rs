use std::path::Path;
use std::path::PathBuf;

use bevy_math::Mat4;
use bevy_math::Vec3;
use d3d11_common::asset::AssetManager;
use d3d11_common::command_line::SampleCommandLine;
use d3d11_common::dx_sample::Sample;
use d3d11_common::error::MyResult;
use d3d11_common::geometry::VertexNormalUv;
use d3d11_common::mesh::CubeMesh;
use d3d11_common::model::ObjImporter;
use d3d11_common::render_device::RenderDevice;
use d3d11_common::shader_compiler::FxcCompiler;
use d3d11_common::shader_manager::ShaderManager;
use d3d11_common::CORNFLOWER_BLUE;
use tracing::info;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;

/// Fields drop in order, and the device reports live objects when it goes.
struct Graphics {
    shaders: ShaderManager,
    cube: CubeMesh<VertexNormalUv>,
    device: RenderDevice,
}

pub struct Tutorial01 {
    command_line: SampleCommandLine,
    assets: AssetManager<ObjImporter, FxcCompiler>,
    graphics: Option<Graphics>,
}

impl Sample for Tutorial01 {
    const CLASS_NAME: PCWSTR = w!("TUTORIAL_01");

    fn new(command_line: &SampleCommandLine) -> MyResult<Self> {
        let mut assets = AssetManager::new(ObjImporter, FxcCompiler)?;
        assets.add_existing_paths(&command_line.asset_paths);
        assets.add_existing_paths([
            PathBuf::from("assets/raw"),
            Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/raw"),
        ]);

        Ok(Self {
            command_line: command_line.clone(),
            assets,
            graphics: None,
        })
    }

    fn bind_to_window(&mut self, hwnd: HWND) -> MyResult<()> {
        let device = RenderDevice::new(hwnd, &self.command_line)?;
        let mut shaders = ShaderManager::new(&device, FxcCompiler)?;
        let vertex_shader = self.assets.resolve("basicVS.hlsl")?;
        shaders.load_vs_from_file::<VertexNormalUv>(&vertex_shader, "VSMain")?;
        let pixel_shader = self.assets.resolve("basicPS.hlsl")?;
        shaders.load_ps_from_file(&pixel_shader, "PSMain")?;

        let context = device.context();
        shaders.update_projection(context, device.aspect_ratio());
        shaders.update_view(
            context,
            Mat4::look_at_lh(Vec3::new(0.0, 2.0, -6.0), Vec3::ZERO, Vec3::Y),
        );
        shaders.update_world(
            context,
            Mat4::from_rotation_y(30f32.to_radians()) * Mat4::from_rotation_x(15f32.to_radians()),
        );

        let cube = CubeMesh::new(device.device())?;
        info!("Tutorial 01 ready");
        self.graphics = Some(Graphics {
            device,
            shaders,
            cube,
        });
        Ok(())
    }

    fn render(&mut self) -> MyResult<()> {
        let Some(graphics) = &self.graphics else {
            return Ok(());
        };
        let context = graphics.device.context();

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
        self.graphics = None;
    }

    fn title(&self) -> String {
        "Tutorial - 01".into()
    }

    fn window_size(&self) -> (i32, i32) {
        (800, 600)
    }
}
