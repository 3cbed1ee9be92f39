use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Manage images in the cloud bucket
///
/// The target account follows `APP_ENV` (production, staging or development). When
/// `APP_ENV` is unset the tool runs in development and talks to `LocalStack` at
/// <http://localhost:4566>. Set `APP_ENV=production` to reach the real bucket.
#[derive(Debug, Parser)]
#[command(name = "image-cli", version, arg_required_else_help = true)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["list", "upload", "download"]),
))]
pub struct Cli {
    /// List files available on s3
    #[arg(short, long)]
    pub list: bool,

    /// Upload image file from path to s3
    #[arg(short, long, value_name = "PATH")]
    pub upload: Option<PathBuf>,

    /// Download image file from s3 to cwd
    #[arg(short, long, value_name = "KEY")]
    pub download: Option<String>,

    /// Name for file to be uploaded/downloaded as (optional)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// The single operation of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Page through the bucket
    List,
    /// Upload a local file
    Upload {
        /// Local file to upload
        path: PathBuf,
        /// Identifier to store it under instead of the file's base name
        name: Option<String>,
    },
    /// Download an image into the working directory
    Download {
        /// Identifier of the image, leading path components ignored
        key: String,
        /// Local file name instead of the identifier
        name: Option<String>,
    },
}

impl Cli {
    /// Selected operation, `None` only if parsing skipped the group check
    #[must_use]
    pub fn operation(self) -> Option<Operation> {
        if self.list {
            return Some(Operation::List);
        }
        if let Some(path) = self.upload {
            return Some(Operation::Upload {
                path,
                name: self.name,
            });
        }
        self.download.map(|key| Operation::Download {
            key,
            name: self.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("image-cli").chain(args.iter().copied()))
    }

    #[test]
    fn test_list_flag() {
        assert_eq!(parse(&["-l"]).unwrap().operation(), Some(Operation::List));
        assert_eq!(
            parse(&["--list"]).unwrap().operation(),
            Some(Operation::List)
        );
    }

    #[test]
    fn test_upload_with_name() {
        let cli = parse(&["-u", "photos/cat.png", "-n", "kitty.png"]).unwrap();

        assert_eq!(
            cli.operation(),
            Some(Operation::Upload {
                path: PathBuf::from("photos/cat.png"),
                name: Some("kitty.png".to_string()),
            })
        );
    }

    #[test]
    fn test_download_without_name() {
        let cli = parse(&["--download", "images/dog.jpg"]).unwrap();

        assert_eq!(
            cli.operation(),
            Some(Operation::Download {
                key: "images/dog.jpg".to_string(),
                name: None,
            })
        );
    }

    #[test]
    fn test_operations_are_mutually_exclusive() {
        let error = parse(&["-l", "-u", "cat.png"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_no_arguments_prints_usage_with_status_2() {
        let error = parse(&[]).unwrap_err();

        assert_eq!(
            error.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_name_alone_is_not_an_operation() {
        let error = parse(&["-n", "kitty.png"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_long_help_names_the_development_default() {
        let help = Cli::command().render_long_help().to_string();

        assert!(help.contains("APP_ENV"));
        assert!(help.contains("http://localhost:4566"));
    }
}
