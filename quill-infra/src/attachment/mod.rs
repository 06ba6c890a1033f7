pub mod storage;

pub use storage::LocalImageStore;

/// 已上传图片的存储
///
/// 内容核心只负责在文章不再引用某张图片时释放它；上传与缩放不在此处。
pub trait ImageStore: Send + Sync {
    /// 按公开路径（例如 `/uploads/posts/abc.jpg`）释放图片，不存在时视为成功
    fn release(&self, public_path: &str) -> anyhow::Result<()>;
}
