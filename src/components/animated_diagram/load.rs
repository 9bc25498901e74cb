//! Fetching and parsing a diagram's SVG at mount time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomParser, Element, Response, SupportedType};

use super::cells::SvgDiagram;
use crate::components::tree_animator::DiagramError;

/// Tracks whether the component that started a load is still mounted.
///
/// The load runs detached from the component, so its result is only applied
/// if the guard has not been released by then.
#[derive(Clone, Debug)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
	/// A guard for an owner that is mounted now.
	pub fn new() -> Self {
		Self(Arc::new(AtomicBool::new(true)))
	}

	/// Marks the owner as gone. Every clone observes it.
	pub fn release(&self) {
		self.0.store(false, Ordering::Release);
	}

	/// Whether [`MountGuard::release`] has not been called yet.
	pub fn is_mounted(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	/// `value` if the owner is still mounted, otherwise `None`.
	pub fn admit<T>(&self, value: T) -> Option<T> {
		self.is_mounted().then_some(value)
	}
}

impl Default for MountGuard {
	fn default() -> Self {
		Self::new()
	}
}

/// Fetches `url` and parses it as a sequenced SVG diagram.
pub async fn load_svg(url: &str) -> Result<SvgDiagram, DiagramError> {
	let text = fetch_text(url).await?;
	parse_svg(&text)
}

async fn fetch_text(url: &str) -> Result<String, DiagramError> {
	let window = web_sys::window().ok_or(DiagramError::NoDocument)?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(js_error)?
		.dyn_into()
		.map_err(js_error)?;
	if !response.ok() {
		return Err(DiagramError::Http(response.status_text()));
	}
	let body = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?;
	body.as_string()
		.ok_or_else(|| DiagramError::Fetch("response body is not text".to_string()))
}

fn parse_svg(text: &str) -> Result<SvgDiagram, DiagramError> {
	let parser = DomParser::new().map_err(js_error)?;
	let document = parser
		.parse_from_string(text, SupportedType::ImageSvgXml)
		.map_err(|_| DiagramError::InvalidSvg)?;
	let svg = document
		.query_selector("svg")
		.ok()
		.flatten()
		.ok_or(DiagramError::InvalidSvg)?;

	let cells = svg.query_selector_all("[data-cell-id]").map_err(js_error)?;
	let cell_ids: Vec<String> = (0..cells.length())
		.filter_map(|i| cells.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.filter_map(|element| element.get_attribute("data-cell-id"))
		.collect();

	Ok(SvgDiagram::new(svg.outer_html(), cell_ids))
}

fn js_error(value: JsValue) -> DiagramError {
	let message = value
		.dyn_ref::<js_sys::Error>()
		.map(|e| String::from(e.message()))
		.or_else(|| value.as_string())
		.unwrap_or_else(|| format!("{:?}", value));
	DiagramError::Fetch(message)
}
