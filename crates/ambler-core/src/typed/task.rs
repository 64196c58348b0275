//! Task trait - 型付き Task の定義

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Task は task_type と型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct MyTask {
///     message: String,
/// }
///
/// impl Task for MyTask {
///     const TYPE: &'static str = "my_namespace.my_task.v1";
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize`: envelope payload への保存のため
/// - `DeserializeOwned`: payload からの復元のため（'static に対応）
/// - `Send + Sync`: 複数スレッドから安全に使えるため
/// - `'static`: Arc に格納できるため（参照を持たない）
pub trait Task: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// task_type の定義
    ///
    /// # 命名規約
    /// - `{namespace}.{domain}.{action}.v{major}`
    /// - 例: `ambler.feed.backfill.v1`
    const TYPE: &'static str;
}
