//! Capture configuration

use crate::demux::DEFAULT_MAX_BUFFER_SIZE;
use crate::error::{Error, Result};

/// Capture process options
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture program to spawn
    pub program: String,

    /// Camera index
    pub camera: u32,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Target frame rate
    pub fps: u32,

    /// Bytes requested per read from the process stdout
    pub read_chunk_size: usize,

    /// Demuxer buffer cap for unterminated frames
    pub max_buffer_size: usize,

    /// Extra arguments appended after the generated ones
    pub extra_args: Vec<String>,

    /// Full argument list replacing the generated one (non-rpicam producers)
    pub custom_args: Option<Vec<String>>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: "rpicam-vid".to_string(),
            camera: 0,
            width: 640,
            height: 480,
            fps: 15,
            read_chunk_size: 4096,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            extra_args: Vec::new(),
            custom_args: None,
        }
    }
}

impl CaptureConfig {
    /// Create a config for a different capture program
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Create a config for an arbitrary MJPEG producer with its own arguments
    ///
    /// Width, height and fps are then only reported, not passed on.
    pub fn custom<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            custom_args: Some(args.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Set the frame size
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the camera index
    pub fn camera(mut self, camera: u32) -> Self {
        self.camera = camera;
        self
    }

    /// Set the read chunk size
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Set the demuxer buffer cap
    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Append an extra argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Check the values before spawning anything
    pub fn validate(&self) -> Result<()> {
        if self.program.is_empty() {
            return Err(Error::Config("capture program is empty".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "invalid resolution {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(Error::Config("fps must be greater than zero".into()));
        }
        if self.read_chunk_size == 0 {
            return Err(Error::Config("read chunk size must be greater than zero".into()));
        }
        Ok(())
    }

    /// Arguments for an `rpicam-vid` style MJPEG capture to stdout
    ///
    /// Custom arguments, when set, are returned verbatim.
    pub fn command_args(&self) -> Vec<String> {
        if let Some(args) = &self.custom_args {
            return args.clone();
        }

        let mut args = vec![
            "--camera".to_string(),
            self.camera.to_string(),
            "--width".to_string(),
            self.width.to_string(),
            "--height".to_string(),
            self.height.to_string(),
            "--framerate".to_string(),
            self.fps.to_string(),
            "--codec".to_string(),
            "mjpeg".to_string(),
            "--inline".to_string(),
            "-t".to_string(),
            "0".to_string(),
            "-o".to_string(),
            "-".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}
