mod dom;
mod raf;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::{rngs::SmallRng, SeedableRng};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event, HtmlAudioElement, Window};
use web_time::{Instant, SystemTime};

use crate::config::PlayerConfig;
use crate::controller::{PendingPlay, PlaybackController};
use crate::error::{Error, Result};
use crate::host::MediaEvent;
use crate::logging;
use crate::meter::star_field;

use dom::{describe, element_by_id, AudioElement, DomView, IframeFallback};
use raf::RafScheduler;

/// Optional `<script type="application/json">` holding a [`PlayerConfig`].
const CONFIG_ELEMENT_ID: &str = "radio-vu-config";

type WebController = PlaybackController<AudioElement, IframeFallback, DomView, RafScheduler, SmallRng>;
type Shared = Rc<RefCell<WebController>>;

thread_local! {
    // The widget lives for the lifetime of the page.
    static WIDGET: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| Error::Dom("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Dom("no document".into()))?;

    let config = load_config(&document)?;
    logging::init(config.level_filter()?);

    let widget = mount(&window, &document, &config)?;
    WIDGET.with(|slot| *slot.borrow_mut() = Some(widget));
    log::info!("radio widget ready for {}", config.stream_url);
    Ok(())
}

fn load_config(document: &Document) -> Result<PlayerConfig> {
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(json) if !json.trim().is_empty() => PlayerConfig::from_json(&json),
        _ => Ok(PlayerConfig::default()),
    }
}

fn mount(window: &Window, document: &Document, config: &PlayerConfig) -> Result<Shared> {
    let ids = &config.elements;
    let audio: HtmlAudioElement = element_by_id(document, &ids.audio)?;
    let play_button: Element = element_by_id(document, &ids.play_button)?;
    let stop_button: Element = element_by_id(document, &ids.stop_button)?;
    let status: Element = element_by_id(document, &ids.status)?;
    let meter: Element = element_by_id(document, &ids.meter)?;
    let stars: Element = element_by_id(document, &ids.stars)?;

    let mut rng = SmallRng::from_os_rng();
    let bars = dom::create_bars(document, &meter, &config.meter)?;
    dom::create_stars(document, &stars, &star_field(config.star_count, &mut rng))?;

    let media = AudioElement::new(audio.clone());
    let fallback = IframeFallback::new(document.clone());
    let view = DomView::new(status, play_button.clone(), bars);

    let controller: Shared = Rc::new_cyclic(|weak: &Weak<RefCell<WebController>>| {
        let weak = weak.clone();
        let scheduler = RafScheduler::new(window.clone(), move || {
            let delivered = with_controller(&weak, |c| c.on_frame(Instant::now()));
            if delivered.is_none() && weak.strong_count() > 0 {
                // the frame already fired, so its successor must come from a retry
                let weak = weak.clone();
                spawn_local(async move {
                    if with_controller(&weak, |c| c.on_frame(Instant::now())).is_none() {
                        log::error!("frame dropped twice, meter halted until the next play");
                    }
                });
            }
        });
        RefCell::new(PlaybackController::new(
            config, media, fallback, view, scheduler, rng,
        ))
    });

    bind_buttons(&play_button, &stop_button, &controller)?;
    bind_media_events(&audio, &controller)?;
    Ok(controller)
}

/// Runs `f` on the controller unless it is gone or already borrowed.
fn with_controller<T>(weak: &Weak<RefCell<WebController>>, f: impl FnOnce(&mut WebController) -> T) -> Option<T> {
    let controller = weak.upgrade()?;
    let Ok(mut guard) = controller.try_borrow_mut() else {
        log::warn!("controller busy, callback skipped");
        return None;
    };
    Some(f(&mut guard))
}

async fn settle(weak: Weak<RefCell<WebController>>, pending: PendingPlay<js_sys::Promise>) {
    let result = JsFuture::from(pending.request)
        .await
        .map(|_| ())
        .map_err(|err| Error::PlayRejected(describe(&err)));
    with_controller(&weak, |c| c.on_play_settled(pending.generation, result));
}

fn listen(target: &Element, event: &str, handler: impl FnMut(Event) + 'static) -> Result<()> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| Error::Dom(format!("listen {event}: {}", describe(&err))))?;
    closure.forget();
    Ok(())
}

fn bind_buttons(play_button: &Element, stop_button: &Element, controller: &Shared) -> Result<()> {
    let weak = Rc::downgrade(controller);
    listen(play_button, "click", move |_event| {
        let pending = with_controller(&weak, |c| c.toggle(SystemTime::now())).flatten();
        if let Some(pending) = pending {
            spawn_local(settle(weak.clone(), pending));
        }
    })?;

    let weak = Rc::downgrade(controller);
    listen(stop_button, "click", move |_event| {
        with_controller(&weak, |c| c.stop());
    })
}

fn bind_media_events(audio: &HtmlAudioElement, controller: &Shared) -> Result<()> {
    let simple = [
        ("play", MediaEvent::Play),
        ("pause", MediaEvent::Pause),
        ("ended", MediaEvent::Ended),
    ];
    for (name, event) in simple {
        let weak = Rc::downgrade(controller);
        listen(audio, name, move |_event| {
            with_controller(&weak, |c| c.on_media_event(event.clone()));
        })?;
    }

    let weak = Rc::downgrade(controller);
    let element = audio.clone();
    listen(audio, "error", move |_event| {
        let detail = AudioElement::error_detail(&element);
        with_controller(&weak, |c| c.on_media_event(MediaEvent::Error(detail)));
    })
}
