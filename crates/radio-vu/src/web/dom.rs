use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, HtmlIFrameElement};

use crate::config::MeterConfig;
use crate::controller::{Glyph, Status};
use crate::error::{Error, Result};
use crate::host::{FallbackSurface, MediaElement, PlayerView};
use crate::meter::{bar_rotation_deg, BarLevel, BarScale, Star};

pub fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| Error::Dom(format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| Error::Dom(format!("#{id} is not the expected element type")))
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T> {
    document
        .create_element(tag)
        .map_err(|err| Error::Dom(format!("create <{tag}>: {}", describe(&err))))?
        .dyn_into::<T>()
        .map_err(|_| Error::Dom(format!("<{tag}> has an unexpected type")))
}

fn style(el: &Element, css: &str) -> Result<()> {
    el.set_attribute("style", css)
        .map_err(|err| Error::Dom(format!("set style: {}", describe(&err))))
}

fn append(parent: &Element, child: &Element) -> Result<()> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|err| Error::Dom(format!("append child: {}", describe(&err))))
}

/// Human readable form of a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(err.name()), String::from(err.message()));
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Creates the ring of meter bars inside `meter`, all at rest.
pub fn create_bars(document: &Document, meter: &Element, config: &MeterConfig) -> Result<Vec<HtmlElement>> {
    let rest = BarScale::from_config(config).rest();
    (0..config.bar_count)
        .map(|i| -> Result<HtmlElement> {
            let bar: HtmlElement = create(document, "div")?;
            bar.set_class_name("vu-bar");
            style(
                &bar,
                &format!(
                    "transform: translate(-50%, 0) rotate({}deg); transform-origin: 50% 0%; height: {}px; opacity: {};",
                    bar_rotation_deg(i, config.bar_count),
                    rest.height_px,
                    rest.opacity
                ),
            )?;
            append(meter, &bar)?;
            Ok(bar)
        })
        .collect()
}

pub fn create_stars(document: &Document, container: &Element, stars: &[Star]) -> Result<()> {
    for star in stars {
        let el: HtmlElement = create(document, "div")?;
        el.set_class_name("star");
        style(
            &el,
            &format!(
                "left: {}%; top: {}%; width: {size}px; height: {size}px; animation-delay: {}s;",
                star.left_pct,
                star.top_pct,
                star.delay_s,
                size = star.size_px
            ),
        )?;
        append(container, &el)?;
    }
    Ok(())
}

/// The page's `<audio>` element.
pub struct AudioElement {
    element: HtmlAudioElement,
}

impl AudioElement {
    pub fn new(element: HtmlAudioElement) -> Self {
        Self { element }
    }

    /// Describes the element's current `MediaError`, if any.
    pub fn error_detail(element: &HtmlAudioElement) -> String {
        match element.error().map(|e| e.code()) {
            Some(1) => "MEDIA_ERR_ABORTED".into(),
            Some(2) => "MEDIA_ERR_NETWORK".into(),
            Some(3) => "MEDIA_ERR_DECODE".into(),
            Some(4) => "MEDIA_ERR_SRC_NOT_SUPPORTED".into(),
            Some(code) => format!("media error code {code}"),
            None => "unknown media error".into(),
        }
    }
}

impl MediaElement for AudioElement {
    type PendingPlay = js_sys::Promise;

    fn pause(&mut self) {
        if let Err(err) = self.element.pause() {
            log::warn!("pause failed: {}", describe(&err));
        }
    }

    fn clear_source(&mut self) {
        if let Err(err) = self.element.remove_attribute("src") {
            log::warn!("clearing src failed: {}", describe(&err));
        }
    }

    fn load(&mut self) {
        self.element.load();
    }

    fn set_source(&mut self, url: &str) {
        self.element.set_src(url);
        self.element.set_preload("auto");
    }

    fn play(&mut self) -> Result<js_sys::Promise> {
        self.element
            .play()
            .map_err(|err| Error::PlayRejected(describe(&err)))
    }
}

/// Hidden `<iframe>` pointed at the stream.
pub struct IframeFallback {
    document: Document,
    frame: Option<HtmlIFrameElement>,
}

impl IframeFallback {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            frame: None,
        }
    }
}

impl FallbackSurface for IframeFallback {
    fn attach(&mut self, url: &str) -> Result<()> {
        self.detach();
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Fallback("document has no body".into()))?;
        let frame: HtmlIFrameElement = create(&self.document, "iframe")
            .map_err(|err| Error::Fallback(err.to_string()))?;
        frame.set_src(url);
        style(&frame, "display: none;").map_err(|err| Error::Fallback(err.to_string()))?;
        append(&body, &frame).map_err(|err| Error::Fallback(err.to_string()))?;
        self.frame = Some(frame);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.remove();
        }
    }

    fn is_attached(&self) -> bool {
        self.frame.is_some()
    }
}

pub struct DomView {
    status: Element,
    play_button: Element,
    bars: Vec<HtmlElement>,
}

impl DomView {
    pub fn new(status: Element, play_button: Element, bars: Vec<HtmlElement>) -> Self {
        Self {
            status,
            play_button,
            bars,
        }
    }
}

impl PlayerView for DomView {
    fn set_status(&mut self, status: Status) {
        self.status.set_text_content(Some(status.text()));
    }

    fn set_glyph(&mut self, glyph: Glyph) {
        self.play_button.set_text_content(Some(glyph.symbol()));
    }

    fn render_bars(&mut self, levels: &[BarLevel]) {
        for (bar, level) in self.bars.iter().zip(levels) {
            let css = bar.style();
            let applied = css
                .set_property("height", &format!("{}px", level.height_px))
                .and_then(|()| css.set_property("opacity", &level.opacity.to_string()));
            if let Err(err) = applied {
                log::warn!("styling bar failed: {}", describe(&err));
            }
        }
    }
}
