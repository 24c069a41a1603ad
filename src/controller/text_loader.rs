use crossbeam_channel::{bounded, Receiver, TryRecvError};
use glam::{Mat4, Vec3};
use meshtext::{MeshGenerator, MeshText, TextSection};
use thiserror::Error;
use tracing::info;

use crate::utils::Mesh;

/// Glyph size of the tessellated text, in world units.
pub const GLYPH_SIZE: f32 = 0.5;

/// Extrusion depth of the glyphs.
pub const GLYPH_DEPTH: f32 = 0.1;

/// Where the text node sits until the first pose copy overwrites it.
pub const TEXT_SPAWN: [f32; 3] = [0.0, 0.7, 0.0];

#[derive(Debug, Error)]
pub enum TextLoadError {
    #[error("font download failed: {0}")]
    Fetch(#[from] ureq::Error),
    #[error("glyph tessellation failed: {0}")]
    Tessellation(String),
    #[error("tessellated text mesh is empty")]
    EmptyMesh,
    #[error("loader thread terminated before delivering a result")]
    Terminated,
}

/// Observable outcome of the text load, shown in the debug overlay. A failed
/// load leaves the scene without the text node, and the loop keeps running.
#[derive(Debug, Clone, PartialEq)]
pub enum TextState {
    Loading,
    Ready,
    Failed(String),
}

impl std::fmt::Display for TextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextState::Loading => write!(f, "loading"),
            TextState::Ready => write!(f, "ready"),
            TextState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// One-shot background load: fetch a TTF font over HTTP, tessellate the demo
/// string into an extruded mesh, hand the result to the frame loop over a
/// channel. The frame loop polls once per frame; the loader never touches
/// scene state itself.
pub struct TextLoader {
    receiver: Receiver<Result<Mesh, TextLoadError>>,
}

impl TextLoader {
    pub fn spawn(url: String, text: String) -> Self {
        let (sender, receiver) = bounded(1);
        std::thread::spawn(move || {
            // The app may have shut down before the load resolved
            let _ = sender.send(load(&url, &text));
        });
        Self { receiver }
    }

    /// Non-blocking check for the load outcome. Returns `None` while the
    /// fetch is still in flight.
    pub fn poll(&self) -> Option<Result<Mesh, TextLoadError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TextLoadError::Terminated)),
        }
    }
}

fn load(url: &str, text: &str) -> Result<Mesh, TextLoadError> {
    info!(url, "fetching font");
    let font = fetch_font(url)?;
    info!(bytes = font.len(), "font downloaded, tessellating");
    tessellate(font, text)
}

fn fetch_font(url: &str) -> Result<Vec<u8>, TextLoadError> {
    let mut response = ureq::get(url).call()?;
    Ok(response.body_mut().read_to_vec()?)
}

fn tessellate(font: Vec<u8>, text: &str) -> Result<Mesh, TextLoadError> {
    // The generator borrows the font for its whole lifetime; the font is
    // loaded once per process and never dropped.
    let font: &'static [u8] = Vec::leak(font);
    let mut generator = MeshGenerator::new(font);

    let scale = Mat4::from_scale(Vec3::new(GLYPH_SIZE, GLYPH_SIZE, GLYPH_DEPTH));
    let glyphs: MeshText = generator
        .generate_section(text, false, Some(&scale.to_cols_array()))
        .map_err(|e| TextLoadError::Tessellation(format!("{e:?}")))?;

    if glyphs.vertices.is_empty() {
        return Err(TextLoadError::EmptyMesh);
    }

    let mut mesh = Mesh::from_triangle_soup(&glyphs.vertices);
    mesh.center();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_failed_fetch_is_reported_over_the_channel() {
        // Port 9 (discard) refuses connections on any sane test host
        let loader = TextLoader::spawn("http://127.0.0.1:9/font.ttf".into(), "hi".into());
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match loader.poll() {
                Some(Err(TextLoadError::Fetch(_))) => return,
                Some(Err(other)) => panic!("expected a fetch error, got {other}"),
                Some(Ok(_)) => panic!("fetch from a refused port cannot succeed"),
                None if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                None => panic!("loader did not resolve in time"),
            }
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TextState::Loading.to_string(), "loading");
        assert_eq!(TextState::Ready.to_string(), "ready");
        assert_eq!(
            TextState::Failed("no route".into()).to_string(),
            "failed: no route"
        );
    }
}
