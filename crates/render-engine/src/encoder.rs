//! Video encoder seam and the ffmpeg-backed implementation.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use image::RgbImage;
use screenlog_common::error::{ScreenlogError, ScreenlogResult};

/// Accepts frames of one fixed size at a fixed rate and writes a container.
pub trait VideoEncoder: Send {
    /// Append one frame. Its dimensions must match the encoder's.
    fn push(&mut self, frame: &RgbImage) -> ScreenlogResult<()>;

    /// Flush and finalize the output file.
    fn finish(&mut self) -> ScreenlogResult<()>;
}

/// Opens encoders for output files.
pub trait EncoderFactory: Send + Sync {
    fn create(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> ScreenlogResult<Box<dyn VideoEncoder>>;

    /// Check if this encoder is available on the system.
    fn is_available(&self) -> bool;

    /// Encoder name.
    fn name(&self) -> &str;
}

/// Encodes by piping raw RGB24 frames into an `ffmpeg` child process.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoderFactory;

impl EncoderFactory for FfmpegEncoderFactory {
    fn create(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> ScreenlogResult<Box<dyn VideoEncoder>> {
        Ok(Box::new(FfmpegEncoder::spawn(path, width, height, fps)?))
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

pub struct FfmpegEncoder {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_task: Option<JoinHandle<String>>,
    frames: u64,
    finished: bool,
}

impl FfmpegEncoder {
    pub fn spawn(path: &Path, width: u32, height: u32, fps: u32) -> ScreenlogResult<Self> {
        let args = ffmpeg_args(path, width, height, fps);
        tracing::debug!(?args, "Running ffmpeg");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScreenlogError::encode(format!("Failed to start ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScreenlogError::encode("Failed to capture ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ScreenlogError::encode("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        tracing::info!(
            pid = child.id(),
            output = %path.display(),
            width,
            height,
            fps,
            "ffmpeg process started"
        );

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            child,
            stdin: Some(stdin),
            stderr_task: Some(stderr_task),
            frames: 0,
            finished: false,
        })
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr_task
            .take()
            .map(|task| {
                task.join()
                    .unwrap_or_else(|_| "<failed to join stderr reader>".to_string())
            })
            .unwrap_or_default()
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn push(&mut self, frame: &RgbImage) -> ScreenlogResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(ScreenlogError::encode(format!(
                "Frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ScreenlogError::encode("ffmpeg input already closed"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| ScreenlogError::encode(format!("Failed writing frame to ffmpeg: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> ScreenlogResult<()> {
        // Closing stdin signals end of input so ffmpeg can finalize the container.
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| ScreenlogError::encode(format!("Failed to wait on ffmpeg: {e}")))?;
        self.finished = true;
        let stderr_output = self.collect_stderr();

        if !status.success() {
            return Err(ScreenlogError::encode(format!(
                "ffmpeg encode failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(
            output = %self.path.display(),
            frames = self.frames,
            "ffmpeg finished"
        );
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        drop(self.stdin.take());
        if let Err(e) = self.child.kill() {
            tracing::debug!(error = %e, "ffmpeg already exited");
        }
        let _ = self.child.wait();
        let _ = self.collect_stderr();
    }
}

fn ffmpeg_args(path: &Path, width: u32, height: u32, fps: u32) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    args.extend([
        "-s".to_string(),
        format!("{width}x{height}"),
        "-r".to_string(),
        fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-an".to_string(),
        "-c:v".to_string(),
        "mpeg4".to_string(),
        "-q:v".to_string(),
        "3".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        path.to_string_lossy().into_owned(),
    ]);
    args
}

/// Whether `binary` runs from PATH.
pub fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
