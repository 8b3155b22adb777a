use std::io;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

fn runtime_handle() -> io::Result<Handle> {
	if let Ok(handle) = Handle::try_current() {
		return Ok(handle);
	}

	static GLOBAL_RT: OnceLock<Runtime> = OnceLock::new();
	if let Some(runtime) = GLOBAL_RT.get() {
		return Ok(runtime.handle().clone());
	}

	let runtime = tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.worker_threads(2)
		.thread_name("kindred-worker-global")
		.build()?;
	// A racing initializer may have won; its runtime is kept and ours dropped.
	let runtime = GLOBAL_RT.get_or_init(|| runtime);
	Ok(runtime.handle().clone())
}

/// Spawns blocking work on the current (or shared) runtime's blocking pool.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> io::Result<JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_blocking");
	Ok(runtime_handle()?.spawn_blocking(f))
}

/// Spawns a dedicated OS thread.
pub fn spawn_thread<F, R>(class: TaskClass, f: F) -> std::thread::JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_thread");
	std::thread::spawn(f)
}

/// Spawns a dedicated named OS thread.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let name = name.into();
	tracing::trace!(worker_class = class.as_str(), thread = %name, "worker.spawn_named_thread");
	std::thread::Builder::new().name(name).spawn(f)
}
