use anyhow::{Context, Result};
use image::RgbImage;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::error::DocOutlineError;
use crate::ocr::OcrEngine;

/// Runs the `tesseract` CLI on each crop.
#[derive(Debug)]
pub struct TesseractOcr {
    work_dir: PathBuf,
    psm: u8,
    lang: Option<String>,
    counter: AtomicUsize,
}

impl TesseractOcr {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            psm: 6,
            lang: None,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = Some(lang);
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, crop: &RgbImage) -> Result<String> {
        fs::create_dir_all(&self.work_dir)?;
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        let crop_path = self
            .work_dir
            .join(format!("crop_{}_{idx:05}.png", std::process::id()));
        crop.save(&crop_path)
            .with_context(|| format!("failed to write {}", crop_path.display()))?;

        let mut command = Command::new("tesseract");
        command
            .arg(&crop_path)
            .arg("stdout")
            .arg("--psm")
            .arg(self.psm.to_string());
        if let Some(lang) = &self.lang {
            command.arg("-l").arg(lang);
        }
        let output = command
            .output()
            .with_context(|| "failed to invoke tesseract; is it installed?");
        let _ = fs::remove_file(&crop_path);
        let output = output?;

        if !output.status.success() {
            return Err(DocOutlineError::Tool {
                tool: "tesseract",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(clean_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Joins recognized lines with single spaces and trims the result.
pub fn clean_output(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
