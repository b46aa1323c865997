#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Compute,
}

/// Highest HLSL shader model a device can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderModel {
    Sm5_0,
    Undefined,
}

/// Raw `D3D_FEATURE_LEVEL` values.
pub const FEATURE_LEVEL_11_0: u32 = 0xb000;
pub const FEATURE_LEVEL_11_1: u32 = 0xb100;

impl ShaderModel {
    /// Only 11_x devices are given shader model 5.0; anything older gets no
    /// profile at all and shader loading refuses to run.
    pub fn from_feature_level_code(level: u32) -> Self {
        match level {
            FEATURE_LEVEL_11_0 | FEATURE_LEVEL_11_1 => ShaderModel::Sm5_0,
            _ => ShaderModel::Undefined,
        }
    }

    pub fn profile(self, stage: ShaderStage) -> Option<&'static str> {
        match (self, stage) {
            (ShaderModel::Sm5_0, ShaderStage::Vertex) => Some("vs_5_0"),
            (ShaderModel::Sm5_0, ShaderStage::Pixel) => Some("ps_5_0"),
            (ShaderModel::Sm5_0, ShaderStage::Compute) => Some("cs_5_0"),
            (ShaderModel::Undefined, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dx11_levels_get_shader_model_5() {
        for level in [FEATURE_LEVEL_11_0, FEATURE_LEVEL_11_1] {
            let model = ShaderModel::from_feature_level_code(level);
            assert_eq!(model, ShaderModel::Sm5_0);
            assert_eq!(model.profile(ShaderStage::Vertex), Some("vs_5_0"));
            assert_eq!(model.profile(ShaderStage::Pixel), Some("ps_5_0"));
            assert_eq!(model.profile(ShaderStage::Compute), Some("cs_5_0"));
        }
    }

    #[test]
    fn older_levels_have_no_profile() {
        // 10_1, 10_0 and 9_3
        for level in [0xa100, 0xa000, 0x9300] {
            let model = ShaderModel::from_feature_level_code(level);
            assert_eq!(model, ShaderModel::Undefined);
            assert_eq!(model.profile(ShaderStage::Vertex), None);
            assert_eq!(model.profile(ShaderStage::Pixel), None);
        }
    }
}
