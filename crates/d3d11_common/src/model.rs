use std::path::Path;

use bytemuck::Pod;
use bytemuck::Zeroable;
use tracing::debug;
use tracing::warn;

use crate::asset::ResourceLoader;
use crate::error::AssetError;
use crate::error::MyResult;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PositionNormalUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<PositionNormalUv>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn validate(&self) -> MyResult<()> {
        let invalid = |reason: String| AssetError::InvalidMesh {
            name: self.name.clone(),
            reason,
        };
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(invalid("mesh has no geometry".to_owned()).into());
        }
        if self.indices.len() % 3 != 0 {
            return Err(invalid(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            ))
            .into());
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(invalid(format!(
                "index {index} is out of range for {} vertices",
                self.vertices.len()
            ))
            .into());
        }
        Ok(())
    }
}

/// A model holds a fixed number of mesh slots, decided when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    capacity: usize,
    meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn with_capacity(capacity: usize) -> MyResult<Self> {
        if capacity == 0 {
            return Err(eyre::eyre!("a model needs room for at least one mesh").into());
        }
        Ok(Self {
            capacity,
            meshes: Vec::with_capacity(capacity),
        })
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MyResult<()> {
        if self.meshes.len() == self.capacity {
            return Err(AssetError::ModelFull {
                capacity: self.capacity,
            }
            .into());
        }
        self.meshes.push(mesh);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Reads Wavefront OBJ files into [`ModelData`], one mesh per OBJ object.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ResourceLoader for ObjImporter {
    type Resource = ModelData;
    type Options = ();

    fn load(&self, path: &Path, _options: &()) -> MyResult<ModelData> {
        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (objects, materials) = tobj::load_obj(path, &load_options)
            .map_err(|e| eyre::eyre!("failed to parse {}: {e}", path.display()))?;

        if let Err(e) = materials {
            warn!("Materials for {} not loaded: {e}", path.display());
        }

        let objects: Vec<_> = objects
            .into_iter()
            .filter(|o| !o.mesh.indices.is_empty())
            .collect();
        if objects.is_empty() {
            return Err(AssetError::EmptyModel(path.to_path_buf()).into());
        }

        let mut model = ModelData::with_capacity(objects.len())?;
        for object in objects {
            let mesh = convert_mesh(object.name, &object.mesh);
            mesh.validate()?;
            debug!(
                "Imported mesh {:?} with {} vertices and {} indices",
                mesh.name,
                mesh.vertices.len(),
                mesh.index_count()
            );
            model.add_mesh(mesh)?;
        }
        Ok(model)
    }
}

fn convert_mesh(name: String, mesh: &tobj::Mesh) -> MeshData {
    let vertex_count = mesh.positions.len() / 3;
    let vertices = (0..vertex_count)
        .map(|i| {
            let normal = mesh
                .normals
                .get(i * 3..i * 3 + 3)
                .map_or([0.0; 3], |n| [n[0], n[1], n[2]]);
            // Direct3D puts the texture origin at the top left.
            let uv = mesh
                .texcoords
                .get(i * 2..i * 2 + 2)
                .map_or([0.0; 2], |t| [t[0], 1.0 - t[1]]);
            PositionNormalUv {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal,
                uv,
            }
        })
        .collect();

    MeshData {
        name,
        vertices,
        indices: mesh.indices.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(name: &str) -> MeshData {
        MeshData {
            name: name.to_owned(),
            vertices: vec![PositionNormalUv::default(); 3],
            indices: vec![0, 1, 2],
        }
    }

    fn write_obj(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn model_rejects_meshes_past_its_capacity() {
        let mut model = ModelData::with_capacity(2).unwrap();
        model.add_mesh(triangle("a")).unwrap();
        model.add_mesh(triangle("b")).unwrap();

        let error = model.add_mesh(triangle("c")).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<AssetError>(),
            Some(AssetError::ModelFull { capacity: 2 })
        ));
        assert_eq!(model.mesh_count(), 2);
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn zero_capacity_is_refused() {
        assert!(ModelData::with_capacity(0).is_err());
    }

    #[test]
    fn validate_catches_broken_index_lists() {
        assert!(triangle("ok").validate().is_ok());

        let mut partial = triangle("partial");
        partial.indices.push(0);
        assert!(partial.validate().is_err());

        let mut out_of_range = triangle("out");
        out_of_range.indices[2] = 3;
        let error = out_of_range.validate().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<AssetError>(),
            Some(AssetError::InvalidMesh { .. })
        ));

        assert!(MeshData::default().validate().is_err());
    }

    #[test]
    fn imports_a_quad_with_flipped_v() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(
            dir.path(),
            "quad.obj",
            "o quad\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 -1\n\
             f 1/1/1 2/2/1 3/3/1 4/4/1\n",
        );

        let model = ObjImporter.load(&path, &()).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.triangle_count(), 2);

        let mesh = &model.meshes()[0];
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.index_count(), 6);
        let first = mesh
            .vertices
            .iter()
            .find(|v| v.position == [0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(first.uv, [0.0, 1.0]);
        assert_eq!(first.normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn missing_normals_and_uvs_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(
            dir.path(),
            "bare.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );

        let model = ObjImporter.load(&path, &()).unwrap();
        let mesh = &model.meshes()[0];
        assert_eq!(mesh.vertices.len(), 3);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.normal == [0.0; 3] && v.uv == [0.0; 2]));
    }

    #[test]
    fn missing_material_library_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(
            dir.path(),
            "with_mtl.obj",
            "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        assert_eq!(ObjImporter.load(&path, &()).unwrap().mesh_count(), 1);
    }

    #[test]
    fn a_file_without_faces_is_an_empty_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(dir.path(), "points.obj", "v 0 0 0\nv 1 0 0\n");

        let error = ObjImporter.load(&path, &()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<AssetError>(),
            Some(AssetError::EmptyModel(_))
        ));
    }
}
