use super::ImageStore;
use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};

/// 本地文件图片存储
pub struct LocalImageStore {
    base_path: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(base_path: PathBuf, url_prefix: impl Into<String>) -> Self {
        Self {
            base_path,
            url_prefix: url_prefix.into(),
        }
    }

    /// 公开路径 → 本地文件路径
    ///
    /// 去掉URL前缀后必须是不含 `..` 的相对路径。
    fn build_path(&self, public_path: &str) -> Result<PathBuf> {
        let relative = public_path
            .strip_prefix(self.url_prefix.as_str())
            .unwrap_or(public_path)
            .trim_start_matches('/');
        if relative.is_empty() {
            bail!("empty image path: {}", public_path);
        }
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!("image path escapes the upload directory: {}", public_path);
        }
        Ok(self.base_path.join(relative))
    }
}

impl ImageStore for LocalImageStore {
    fn release(&self, public_path: &str) -> Result<()> {
        let full_path = self.build_path(public_path)?;
        if full_path.exists() {
            std::fs::remove_file(&full_path)?;
            tracing::debug!(path = %full_path.display(), "Image released");
        }
        Ok(())
    }
}
