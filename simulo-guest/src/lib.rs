/// Simulo Guest - WASM module boundary
///
/// Exposes the lifecycle entry points the runtime calls and forwards them to
/// the single scene living in this module. Handles cross the boundary as
/// `u64`; every entry point returns `0` or a negative `SceneError` code.
///
/// The imports only exist inside the runtime, so the boundary is compiled for
/// `wasm32` targets only.

#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use host::WasmHost;

// Export names are fixed by the runtime.
#[cfg(target_arch = "wasm32")]
#[allow(non_snake_case)]
mod entry {
    use std::cell::OnceCell;
    use std::rc::Rc;

    use env_logger::Env;
    use log::error;
    use simulo_core::{status, GameConfig, RawHandle, Result, Scene, SceneError};

    use crate::host::WasmHost;

    thread_local! {
        // Set once by `simulo__start`; never replaced.
        static SCENE: OnceCell<Scene> = const { OnceCell::new() };
    }

    fn report(entry: &str, result: Result<()>) -> i32 {
        if let Err(err) = &result {
            error!("{} failed: {}", entry, err);
        }
        status(result)
    }

    fn with_scene(entry: &str, f: impl FnOnce(&Scene) -> Result<()>) -> i32 {
        SCENE.with(|cell| {
            let result = match cell.get() {
                Some(scene) => f(scene),
                None => Err(SceneError::BufferNotRegistered),
            };
            report(entry, result)
        })
    }

    /// Safe to call again: a start that failed is retried, a completed one
    /// is left alone.
    #[no_mangle]
    pub extern "C" fn simulo__start() -> i32 {
        // Output goes to stderr where the runtime provides one.
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
        SCENE.with(|cell| {
            let scene = cell.get_or_init(|| Scene::new(Rc::new(WasmHost)));
            report("simulo__start", scene.start(GameConfig::default()).map(|_| ()))
        })
    }

    #[no_mangle]
    pub extern "C" fn simulo__pose(id: i32, alive: bool) -> i32 {
        with_scene("simulo__pose", |scene| scene.pose_update(id, alive))
    }

    #[no_mangle]
    pub extern "C" fn simulo__update(handle: u64, delta: f32) -> i32 {
        with_scene("simulo__update", |scene| {
            scene.update(RawHandle::from_u64(handle), delta)
        })
    }

    #[no_mangle]
    pub extern "C" fn simulo__recalculate_transform(handle: u64) -> i32 {
        with_scene("simulo__recalculate_transform", |scene| {
            scene
                .recalculate_transform(RawHandle::from_u64(handle))
                .map(|_| ())
        })
    }

    #[no_mangle]
    pub extern "C" fn simulo__drop(handle: u64) -> i32 {
        with_scene("simulo__drop", |scene| {
            scene.drop_handle(RawHandle::from_u64(handle))
        })
    }
}
