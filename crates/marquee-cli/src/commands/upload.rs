//! Upload command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::session::CliContext;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image file to upload (png, jpg, gif or webp)
    pub file: PathBuf,
}

pub async fn run(args: UploadArgs, connection: &ConnectionArgs) -> Result<()> {
    let ctx = CliContext::open(connection)?;
    ctx.require_session()?;

    let url = upload_file(&ctx, &args.file).await?;

    output::success("Image uploaded");
    output::field("URL", &url);
    Ok(())
}

/// Upload a local image and return its public URL.
pub async fn upload_file(ctx: &CliContext, path: &Path) -> Result<String> {
    let content_type = content_type(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Image path has no file name")?
        .to_string();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    eprintln!("{}", format!("Uploading {file_name}...").dimmed());

    ctx.uploads()
        .upload_image(&file_name, content_type, bytes)
        .await
        .context("Failed to upload image")
}

fn content_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    Ok(match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => bail!("Unsupported image type: {}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type(Path::new("a/poster.PNG")).unwrap(), "image/png");
        assert_eq!(content_type(Path::new("poster.jpeg")).unwrap(), "image/jpeg");
        assert!(content_type(Path::new("notes.txt")).is_err());
        assert!(content_type(Path::new("poster")).is_err());
    }
}
