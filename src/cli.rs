// CLI module for argument parsing and configuration

use crate::config::APP_DIR;
use crate::store::StagingMode;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Photoyeet - swipe through your photo library in the terminal
///
/// Drag a photo right to keep it, left to yeet it. Yeeted photos wait in a
/// staging area until you delete them for good.
#[derive(Parser, Debug, Clone)]
#[command(name = "photoyeet")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Photo library root
    ///
    /// If not specified, defaults to your pictures directory.
    pub library: Option<PathBuf>,

    /// Where yeeted photos are kept until deleted
    #[arg(long = "staging", value_enum, default_value = "auto")]
    pub staging: StagingChoice,

    /// App data directory (directory staging and persisted state)
    #[arg(long = "sandbox")]
    pub sandbox: Option<PathBuf>,

    /// Show the welcome screen even if it was dismissed before
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub show_welcome: bool,

    /// Write logs to this file instead of the default location
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

/// Staging mechanism options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StagingChoice {
    /// Use an album when the library supports them, else a directory
    #[default]
    Auto,
    /// A "Yeeted Content" album inside the library
    Album,
    /// A directory inside the app data directory
    Directory,
}

impl From<StagingChoice> for StagingMode {
    fn from(choice: StagingChoice) -> Self {
        match choice {
            StagingChoice::Auto => StagingMode::Auto,
            StagingChoice::Album => StagingMode::Album,
            StagingChoice::Directory => StagingMode::Directory,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Library root, falling back to the pictures directory then `.`
    pub fn library_root(&self) -> PathBuf {
        self.library
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        let library = self.library_root();

        if !library.exists() {
            return Err(format!("Library does not exist: {}", library.display()));
        }

        if !library.is_dir() {
            return Err(format!(
                "Library path is not a directory: {}",
                library.display()
            ));
        }

        if let Some(ref sandbox) = self.sandbox {
            if sandbox.exists() && !sandbox.is_dir() {
                return Err(format!(
                    "Sandbox path is not a directory: {}",
                    sandbox.display()
                ));
            }
        }

        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR)))
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub library: PathBuf,
    pub staging: StagingMode,
    pub sandbox: PathBuf,
    pub show_welcome: bool,
    pub log_file: PathBuf,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let sandbox = args.sandbox.clone().unwrap_or_else(default_data_dir);
        let log_file = args
            .log_file
            .clone()
            .unwrap_or_else(|| default_data_dir().join("photoyeet.log"));

        AppConfig {
            library: args.library_root(),
            staging: args.staging.into(),
            sandbox,
            show_welcome: args.show_welcome,
            log_file,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        AppConfig {
            library: PathBuf::from("."),
            staging: StagingMode::Auto,
            log_file: data_dir.join("photoyeet.log"),
            sandbox: data_dir,
            show_welcome: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_for(library: PathBuf) -> Args {
        Args {
            library: Some(library),
            staging: StagingChoice::Auto,
            sandbox: None,
            show_welcome: false,
            log_file: None,
        }
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_parse_defaults() {
            let args = Args::try_parse_from(["photoyeet", "/photos"]).unwrap();

            assert_eq!(args.library, Some(PathBuf::from("/photos")));
            assert_eq!(args.staging, StagingChoice::Auto);
            assert!(args.sandbox.is_none());
            assert!(!args.show_welcome);
            assert!(args.log_file.is_none());
        }

        #[test]
        fn test_parse_all_flags() {
            let args = Args::try_parse_from([
                "photoyeet",
                "/photos",
                "--staging",
                "directory",
                "--sandbox",
                "/data",
                "--welcome",
                "--log-file",
                "/tmp/yeet.log",
            ])
            .unwrap();

            assert_eq!(args.staging, StagingChoice::Directory);
            assert_eq!(args.sandbox, Some(PathBuf::from("/data")));
            assert!(args.show_welcome);
            assert_eq!(args.log_file, Some(PathBuf::from("/tmp/yeet.log")));
        }

        #[test]
        fn test_parse_rejects_unknown_staging() {
            assert!(Args::try_parse_from(["photoyeet", "--staging", "cloud"]).is_err());
        }

        #[test]
        fn test_staging_choice_conversion() {
            assert_eq!(StagingMode::from(StagingChoice::Auto), StagingMode::Auto);
            assert_eq!(StagingMode::from(StagingChoice::Album), StagingMode::Album);
            assert_eq!(
                StagingMode::from(StagingChoice::Directory),
                StagingMode::Directory
            );
        }

        #[test]
        fn test_validate_nonexistent_library() {
            let args = args_for(PathBuf::from("/nonexistent/path/12345"));

            let result = args.validate();
            assert!(result.is_err());
            assert!(result.unwrap_err().contains("does not exist"));
        }

        #[test]
        fn test_validate_library_is_file() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("photo.jpg");
            std::fs::write(&file, b"x").unwrap();

            let result = args_for(file).validate();
            assert!(result.unwrap_err().contains("not a directory"));
        }

        #[test]
        fn test_validate_sandbox_is_file() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("data");
            std::fs::write(&file, b"x").unwrap();

            let mut args = args_for(temp_dir.path().to_path_buf());
            args.sandbox = Some(file);
            assert!(args.validate().unwrap_err().contains("Sandbox"));
        }

        #[test]
        fn test_validate_success() {
            let temp_dir = TempDir::new().unwrap();
            assert!(args_for(temp_dir.path().to_path_buf()).validate().is_ok());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_app_config_from_args() {
            let args = Args {
                library: Some(PathBuf::from("/test/photos")),
                staging: StagingChoice::Album,
                sandbox: Some(PathBuf::from("/test/data")),
                show_welcome: true,
                log_file: Some(PathBuf::from("/test/log.txt")),
            };

            let config: AppConfig = args.into();

            assert_eq!(config.library, PathBuf::from("/test/photos"));
            assert_eq!(config.staging, StagingMode::Album);
            assert_eq!(config.sandbox, PathBuf::from("/test/data"));
            assert!(config.show_welcome);
            assert_eq!(config.log_file, PathBuf::from("/test/log.txt"));
        }

        #[test]
        fn test_app_config_fills_defaults() {
            let config: AppConfig = args_for(PathBuf::from("/p")).into();

            assert!(config.sandbox.ends_with(APP_DIR) || config.sandbox.ends_with(".photoyeet"));
            assert!(config.log_file.ends_with("photoyeet.log"));
        }

        #[test]
        fn test_app_config_default() {
            let config = AppConfig::default();

            assert_eq!(config.library, PathBuf::from("."));
            assert_eq!(config.staging, StagingMode::Auto);
            assert!(!config.show_welcome);
        }
    }
}
