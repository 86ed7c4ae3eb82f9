//! Meteor Shooter entry point
//!
//! On the web this wires the game to requestAnimationFrame, LocalStorage and
//! the keyboard. Natively it runs a headless autopilot session against a
//! manual clock and file-backed high scores.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, Window};

    use meteor_shooter::feedback::{FeedbackLevels, WebFeedback};
    use meteor_shooter::platform::input::blocks_page_scroll;
    use meteor_shooter::platform::{FrameHandle, LocalStorage, RafScheduler, action_for_key};
    use meteor_shooter::sim::Viewport;
    use meteor_shooter::{Game, GameStatus, ScoreStore, Settings};

    type WebGame = Game<RafScheduler, LocalStorage>;

    /// Global JS function that receives the render snapshot as JSON each frame
    const RENDER_HOOK: &str = "renderMeteorShooter";
    /// Body class set while a round runs (the page dims its start UI)
    const RUNNING_CLASS: &str = "game-running";

    fn viewport_of(window: &Window) -> Viewport {
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        Viewport::new(width as f32, height as f32)
    }

    fn set_running_class(status: GameStatus) {
        let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        else {
            return;
        };
        let _ = body
            .class_list()
            .toggle_with_force(RUNNING_CLASS, status == GameStatus::Running);
    }

    /// Hand the snapshot to the page renderer, if one is installed
    fn present(window: &Window, game: &mut WebGame) {
        let hook = js_sys::Reflect::get(window, &JsValue::from_str(RENDER_HOOK))
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok());
        if let Some(hook) = hook {
            match serde_json::to_string(&game.snapshot()) {
                Ok(json) => {
                    let _ = hook.call1(&JsValue::NULL, &JsValue::from_str(&json));
                }
                Err(err) => log::warn!("Could not serialize snapshot: {}", err),
            }
        }
        game.take_spawn_in();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Meteor Shooter starting...");

        let Some(window) = web_sys::window() else {
            log::warn!("No window available");
            return;
        };

        let settings = Settings::load(&LocalStorage);
        let scheduler = RafScheduler::new();
        let sink = scheduler.sink_slot();
        let seed = js_sys::Date::now() as u64;

        let mut game = Game::new(
            viewport_of(&window),
            scheduler,
            ScoreStore::new(LocalStorage),
            seed,
        )
        .with_feedback(Box::new(WebFeedback::new(FeedbackLevels::from_settings(
            &settings,
        ))));
        game.apply_settings(&settings);
        game.set_status_listener(set_running_class);

        let game = Rc::new(RefCell::new(game));

        // The sink only holds a weak reference; the event listeners below
        // keep the game alive for the lifetime of the page.
        {
            let weak = Rc::downgrade(&game);
            let window = window.clone();
            *sink.borrow_mut() = Some(Box::new(move |handle: FrameHandle, time: f64| {
                if let Some(game) = weak.upgrade() {
                    let mut g = game.borrow_mut();
                    g.frame(handle, time);
                    present(&window, &mut g);
                }
            }));
        }

        setup_keyboard(&window, Rc::clone(&game));
        setup_resize(&window, game);
    }

    fn setup_keyboard(window: &Window, game: Rc<RefCell<WebGame>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let Some(action) = action_for_key(&code) else {
                    return;
                };
                let mut g = game.borrow_mut();
                if g.status() == GameStatus::Running && blocks_page_scroll(&code) {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                g.press(action);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(action) = action_for_key(&event.code()) {
                    game.borrow_mut().release(action);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &Window, game: Rc<RefCell<WebGame>>) {
        let win = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let viewport = viewport_of(&win);
            game.borrow_mut().resize(viewport.width, viewport.height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use meteor_shooter::platform::{FileStore, ManualScheduler};
    use meteor_shooter::sim::{Action, Viewport, autopilot};
    use meteor_shooter::{Game, GameStatus, ScoreStore, Settings};

    /// Directory for settings and high scores
    const DATA_DIR_ENV: &str = "METEOR_SHOOTER_DATA";
    /// Number of autopilot rounds
    const ROUNDS_ENV: &str = "METEOR_SHOOTER_ROUNDS";
    const DEFAULT_ROUNDS: u32 = 3;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Rounds still alive after this many frames are ended by the runner
    const MAX_ROUND_FRAMES: u32 = 60 * 120;

    fn data_dir() -> PathBuf {
        std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("meteor-shooter"))
    }

    fn rounds() -> u32 {
        std::env::var(ROUNDS_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ROUNDS)
    }

    pub fn run() {
        let dir = data_dir();
        log::info!("Meteor Shooter (headless) using {}", dir.display());

        let store = FileStore::new(&dir);
        let settings = Settings::load(&store);
        let driver = ManualScheduler::new();
        let seed: u64 = rand::random();

        let mut game = Game::new(
            Viewport::new(960.0, 720.0),
            driver.clone(),
            ScoreStore::new(store),
            seed,
        );
        game.apply_settings(&settings);
        game.set_status_listener(|status| log::debug!("Status: {}", status.as_str()));

        for round in 1..=rounds() {
            game.press(Action::Start);
            let mut frames = 0;
            while game.status() == GameStatus::Running && frames < MAX_ROUND_FRAMES {
                game.set_input(autopilot(game.sim()));
                for (handle, time) in driver.advance(FRAME_MS) {
                    game.frame(handle, time);
                }
                frames += 1;
            }
            if game.status() == GameStatus::Running {
                log::info!("Round {} survived {} frames, stopping it", round, frames);
                game.end();
            }
            log::info!(
                "Round {}: score {} in {:.1}s (rank {:?})",
                round,
                game.score(),
                frames as f64 * FRAME_MS / 1000.0,
                game.last_rank()
            );
        }

        log::info!("High scores: {:?}", game.scores().load_top());
        game.shutdown();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
