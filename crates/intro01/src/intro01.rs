use std::path::Path;
use std::path::PathBuf;

use bevy_math::Mat4;
use d3d11_common::asset::AssetManager;
use d3d11_common::camera::Camera;
use d3d11_common::camera::DEFAULT_FAR;
use d3d11_common::camera::DEFAULT_FOV_DEGREES;
use d3d11_common::camera::DEFAULT_NEAR;
use d3d11_common::color_shader::ColorShader;
use d3d11_common::command_line::SampleCommandLine;
use d3d11_common::dx_sample::Sample;
use d3d11_common::error::MyResult;
use d3d11_common::mesh::Model;
use d3d11_common::model::ObjImporter;
use d3d11_common::render_device::RenderDevice;
use d3d11_common::shader_compiler::FxcCompiler;
use d3d11_common::CORNFLOWER_BLUE;
use tracing::info;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;

const MODEL: &str = "orb.obj";

/// Fields drop in order, and the device reports live objects when it goes.
struct Graphics {
    shader: ColorShader,
    model: Model,
    device: RenderDevice,
}

/// Loads a model and its shaders through the asset manager and draws it
/// from a fixed camera.
pub struct Intro01 {
    command_line: SampleCommandLine,
    assets: AssetManager<ObjImporter, FxcCompiler>,
    camera: Camera,
    graphics: Option<Graphics>,
}

impl Sample for Intro01 {
    const CLASS_NAME: PCWSTR = w!("WTGTP_01");

    fn new(command_line: &SampleCommandLine) -> MyResult<Self> {
        let mut assets = AssetManager::new(ObjImporter, FxcCompiler)?;
        let added = assets.add_existing_paths(&command_line.asset_paths)
            + assets.add_existing_paths([
                PathBuf::from("assets/raw"),
                Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/raw"),
            ]);
        if added == 0 {
            return Err(eyre::eyre!("no asset search path could be added").into());
        }

        let mut camera = Camera::new();
        camera.set_position(0.0, 1.0, -5.0);

        Ok(Self {
            command_line: command_line.clone(),
            assets,
            camera,
            graphics: None,
        })
    }

    fn bind_to_window(&mut self, hwnd: HWND) -> MyResult<()> {
        let device = RenderDevice::new(hwnd, &self.command_line)?;

        let model = Model::from_data(device.device(), self.assets.load_model(MODEL)?)?;
        self.assets.load_shader("basicVS.hlsl", "vs_5_0", "VSMain")?;
        self.assets.load_shader("basicPS.hlsl", "ps_5_0", "PSMain")?;
        let (Some(vs), Some(ps)) = (
            self.assets.get_shader("basicVS.hlsl"),
            self.assets.get_shader("basicPS.hlsl"),
        ) else {
            return Err(eyre::eyre!("shaders missing after loading").into());
        };
        let shader = ColorShader::new(device.device(), vs, ps)?;

        self.camera.set_perspective(
            DEFAULT_FOV_DEGREES,
            device.aspect_ratio(),
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        info!(
            "Intro 01 ready with {} models and {} shaders",
            self.assets.model_count(),
            self.assets.shader_count()
        );
        self.graphics = Some(Graphics {
            device,
            shader,
            model,
        });
        Ok(())
    }

    fn render(&mut self) -> MyResult<()> {
        let Some(graphics) = &self.graphics else {
            return Ok(());
        };
        self.camera.render();
        let context = graphics.device.context();

        graphics.device.clear(CORNFLOWER_BLUE, 1.0, 0);
        graphics.device.bind_targets();
        graphics.shader.render(
            context,
            Mat4::IDENTITY,
            self.camera.view(),
            self.camera.projection(),
        )?;
        graphics.model.render(context);
        graphics.device.present()
    }

    fn on_resize(&mut self, width: u32, height: u32) -> MyResult<()> {
        if let Some(graphics) = &mut self.graphics {
            graphics.device.resize(width, height)?;
            self.camera.set_perspective(
                DEFAULT_FOV_DEGREES,
                graphics.device.aspect_ratio(),
                DEFAULT_NEAR,
                DEFAULT_FAR,
            );
        }
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.graphics = None;
    }

    fn title(&self) -> String {
        "Walking The Graphics Pipeline - 01".into()
    }

    fn window_size(&self) -> (i32, i32) {
        (800, 600)
    }
}
