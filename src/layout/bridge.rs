use anyhow::{Context, Result};
use image::RgbImage;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::model::RawDetectionTensor;
use crate::layout::LayoutModel;

/// Tensor payload printed by the layout helper script.
#[derive(Debug, Clone, Deserialize)]
pub struct TensorPayload {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Runs the layout network through an external helper script.
///
/// The script receives `--image <png>` and prints a JSON `TensorPayload` on stdout.
#[derive(Debug)]
pub struct ScriptLayoutModel {
    work_dir: PathBuf,
    script_path: PathBuf,
    interpreter: String,
    input_size: (u32, u32),
    counter: AtomicUsize,
}

impl ScriptLayoutModel {
    pub fn new(work_dir: PathBuf, script_path: PathBuf) -> Self {
        Self {
            work_dir,
            script_path,
            interpreter: "python3".to_string(),
            input_size: (1024, 1024),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn with_interpreter(mut self, interpreter: String) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_size = (width, height);
        self
    }
}

impl LayoutModel for ScriptLayoutModel {
    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    fn infer(&self, image: &RgbImage) -> Result<RawDetectionTensor> {
        fs::create_dir_all(&self.work_dir)?;
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        let image_path = self
            .work_dir
            .join(format!("layout_{}_{idx:04}.png", std::process::id()));
        image
            .save(&image_path)
            .with_context(|| format!("failed to write {}", image_path.display()))?;

        let output = Command::new(&self.interpreter)
            .arg(&self.script_path)
            .arg("--image")
            .arg(&image_path)
            .output()
            .with_context(|| "failed to invoke layout model script");
        let _ = fs::remove_file(&image_path);
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("layout model script failed: {stderr}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_tensor_payload(&stdout)
    }
}

pub fn parse_tensor_payload(json: &str) -> Result<RawDetectionTensor> {
    let payload: TensorPayload =
        serde_json::from_str(json).with_context(|| "failed to parse layout tensor JSON")?;
    let tensor = RawDetectionTensor::from_shape(payload.data, &payload.shape)?;
    Ok(tensor)
}
