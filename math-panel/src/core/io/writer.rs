//! Surface output writers
//!
//! A writer persists one surface together with named per-panel fields. The
//! solver decides the file layout and passes running node/panel offsets so a
//! reader can stitch all surfaces of a step back into one global numbering.

use std::fs;
use std::path::Path;

use crate::core::mesh::Surface;

/// Surface writer errors
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// A field does not have one value per panel
    #[error("view {name} has {len} values but the surface has {n_panels} panels")]
    ViewSizeMismatch {
        /// Field name
        name: String,
        /// Number of values supplied
        len: usize,
        /// Number of panels on the surface
        n_panels: usize,
    },
}

/// Persists a surface with per-panel fields
pub trait SurfaceWriter {
    /// File extension including the leading dot
    fn file_extension(&self) -> &str;

    /// Write `surface` to `path`
    ///
    /// `view_names[k]` labels `view_data[k]`, which holds one value per panel.
    fn write(
        &mut self,
        surface: &Surface,
        path: &Path,
        node_offset: usize,
        panel_offset: usize,
        view_names: &[&str],
        view_data: &[Vec<f64>],
    ) -> Result<(), WriterError>;
}

/// Writes one pretty-printed JSON document per surface
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSurfaceWriter;

impl SurfaceWriter for JsonSurfaceWriter {
    fn file_extension(&self) -> &str {
        ".json"
    }

    fn write(
        &mut self,
        surface: &Surface,
        path: &Path,
        node_offset: usize,
        panel_offset: usize,
        view_names: &[&str],
        view_data: &[Vec<f64>],
    ) -> Result<(), WriterError> {
        let mut views = serde_json::Map::new();
        for (name, data) in view_names.iter().zip(view_data) {
            if data.len() != surface.n_panels() {
                return Err(WriterError::ViewSizeMismatch {
                    name: name.to_string(),
                    len: data.len(),
                    n_panels: surface.n_panels(),
                });
            }
            views.insert(name.to_string(), serde_json::json!(data));
        }

        let document = serde_json::json!({
            "generator": format!("math-aero-panel {} ({})", crate::VERSION, crate::GIT_HASH),
            "surface": surface.id().value(),
            "node_offset": node_offset,
            "panel_offset": panel_offset,
            "nodes": surface.nodes().iter().map(|n| n.to_array()).collect::<Vec<_>>(),
            "panels": surface
                .panels()
                .iter()
                .map(|p| p.iter().map(|&n| n + node_offset).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "views": views,
        });

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| WriterError::SerializeError(e.to_string()))?;
        fs::write(path, content)?;
        log::debug!("Wrote {} panels to {}", surface.n_panels(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vector3D;

    fn triangle() -> Surface {
        Surface::new(
            vec![Vector3D::zero(), Vector3D::unit_x(), Vector3D::unit_y()],
            vec![vec![0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_json_document_layout() {
        let dir = std::env::temp_dir().join(format!("panel-writer-{}", std::process::id()));
        let path = dir.join("nested").join("step_0.json");
        let mut writer = JsonSurfaceWriter;
        writer
            .write(&triangle(), &path, 10, 4, &["Pressure"], &[vec![0.25]])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["node_offset"], 10);
        assert_eq!(value["panel_offset"], 4);
        assert_eq!(value["panels"][0], serde_json::json!([10, 11, 12]));
        assert_eq!(value["views"]["Pressure"][0], 0.25);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_view_size_checked() {
        let path = std::env::temp_dir().join("panel-writer-mismatch.json");
        let result = JsonSurfaceWriter.write(&triangle(), &path, 0, 0, &["Bad"], &[vec![]]);
        assert!(matches!(result, Err(WriterError::ViewSizeMismatch { len: 0, .. })));
    }
}
