//! Per-step surface output
//!
//! Files land in `<log folder>/<body id>/<surface kind>_<k>/step_<n><ext>`,
//! where the surface kind is `non_lifting_surface`, `lifting_surface` or
//! `wake`.

use std::fs;
use std::path::PathBuf;

use super::index::SurfaceKind;
use super::{Solver, SolverError};
use crate::core::io::SurfaceWriter;

const SURFACE_VIEWS: [&str; 3] = [
    "DoubletDistribution",
    "SourceDistribution",
    "PressureDistribution",
];
const WAKE_VIEWS: [&str; 1] = ["DoubletDistribution"];

impl Solver {
    /// Write every surface and wake with its coefficients, tagged with `step`
    pub fn log(&self, step: usize, writer: &mut dyn SurfaceWriter) -> Result<(), SolverError> {
        let extension = writer.file_extension().to_string();
        let file_name = format!("step_{step}{extension}");
        let mut node_offset = 0;
        let mut panel_offset = 0;

        for slot in self.index.slots() {
            let body = &self.bodies[slot.body];
            let body_folder = self.log_folder.join(body.id());
            let surface = self.slot_surface(slot);
            let range = slot.range();
            let views = vec![
                self.doublet_coefficients.slice(ndarray::s![range.clone()]).to_vec(),
                self.source_coefficients.slice(ndarray::s![range.clone()]).to_vec(),
                self.pressure_coefficients.slice(ndarray::s![range]).to_vec(),
            ];

            let folder = match slot.kind {
                SurfaceKind::NonLifting(k) => format!("non_lifting_surface_{k}"),
                SurfaceKind::Lifting(k) => format!("lifting_surface_{k}"),
            };
            let path = prepare(body_folder.join(folder))?.join(&file_name);
            writer.write(
                surface,
                &path,
                node_offset,
                panel_offset,
                &SURFACE_VIEWS,
                &views,
            )?;
            node_offset += surface.n_nodes();
            panel_offset += surface.n_panels();

            let SurfaceKind::Lifting(k) = slot.kind else {
                continue;
            };
            let wake = body.lifting_surfaces()[k].wake();
            let path = prepare(body_folder.join(format!("wake_{k}")))?.join(&file_name);
            writer.write(
                wake.surface(),
                &path,
                0,
                panel_offset,
                &WAKE_VIEWS,
                &[wake.doublet_coefficients()],
            )?;
            node_offset += wake.n_nodes();
            panel_offset += wake.n_panels();
        }

        log::debug!("Logged step {step} to {}", self.log_folder.display());
        Ok(())
    }
}

fn prepare(folder: PathBuf) -> Result<PathBuf, SolverError> {
    fs::create_dir_all(&folder)?;
    Ok(folder)
}
