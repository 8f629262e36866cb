// ABOUTME: Native image reference model and the create/activate loading protocol
// ABOUTME: References are single-threaded handles the host completes through load notifications

use crate::constants::mime;
use crate::descriptor::{DescriptorSet, ImageDescriptor};
use crate::extract::{FieldSource, ImageField};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use typed_builder::TypedBuilder;

pub type Callback = Rc<dyn Fn()>;

/// Capabilities of the execution context, injected by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// There is a presentation surface able to load images at all
    pub has_surface: bool,
    /// A multi-source picture construct is available
    pub supports_picture: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self::browser()
    }
}

impl Environment {
    pub fn browser() -> Self {
        Self {
            has_surface: true,
            supports_picture: true,
        }
    }

    /// A surface without multi-source support; references load their fallback source only.
    pub fn legacy() -> Self {
        Self {
            has_surface: true,
            supports_picture: false,
        }
    }

    /// Non-interactive rendering; no image references are ever created.
    pub fn server() -> Self {
        Self {
            has_surface: false,
            supports_picture: true,
        }
    }
}

/// Per-call loading options supplied by the host.
#[derive(Clone, Default, TypedBuilder)]
pub struct LoadOptions {
    /// Load immediately regardless of visibility
    #[builder(default)]
    pub critical: bool,

    #[builder(default)]
    pub is_visible: bool,

    #[builder(default, setter(strip_option))]
    pub on_load: Option<Callback>,

    #[builder(default, setter(strip_option))]
    pub on_error: Option<Callback>,
}

impl LoadOptions {
    pub fn is_eager(&self) -> bool {
        self.critical || self.is_visible
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("critical", &self.critical)
            .field("is_visible", &self.is_visible)
            .field("on_load", &self.on_load.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureSource {
    pub mime_type: String,
    pub src_set: String,
    pub sizes: String,
}

/// Multi-source wrapper; the image itself is the fallback after `sources`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Picture {
    pub sources: Vec<PictureSource>,
}

#[derive(Default)]
struct LoadState {
    src: String,
    src_set: String,
    cross_origin: Option<String>,
    picture: Option<Picture>,
    activated: bool,
    complete: bool,
    natural_width: u32,
    natural_height: u32,
    current_src: Option<String>,
    on_ready: Option<Callback>,
    load_listeners: Vec<Callback>,
    error_listeners: Vec<Callback>,
}

/// Shared handle to one native image.
#[derive(Clone, Default)]
pub struct ImageReference {
    inner: Rc<RefCell<LoadState>>,
}

impl ImageReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src(&self) -> String {
        self.inner.borrow().src.clone()
    }

    pub fn src_set(&self) -> String {
        self.inner.borrow().src_set.clone()
    }

    pub fn cross_origin(&self) -> Option<String> {
        self.inner.borrow().cross_origin.clone()
    }

    pub fn picture(&self) -> Option<Picture> {
        self.inner.borrow().picture.clone()
    }

    /// Whether sources were assigned and the host may start loading.
    pub fn is_activated(&self) -> bool {
        self.inner.borrow().activated
    }

    pub fn is_complete(&self) -> bool {
        self.inner.borrow().complete
    }

    /// Finished loading with real pixels; broken images report zero dimensions.
    pub fn completed(&self) -> bool {
        let state = self.inner.borrow();
        state.complete && state.natural_width != 0 && state.natural_height != 0
    }

    /// The source the host actually picked, available after loading.
    pub fn current_src(&self) -> Option<String> {
        self.inner.borrow().current_src.clone()
    }

    pub fn ptr_eq(&self, other: &ImageReference) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Host notification: the image finished loading.
    ///
    /// `current_src` defaults to the assigned `src` when the host does not report
    /// which candidate it picked. The readiness callback fires at most once per
    /// image; load listeners fire on every notification.
    pub fn finish_load(&self, width: u32, height: u32, current_src: Option<&str>) {
        let (ready, listeners) = {
            let mut state = self.inner.borrow_mut();
            let resolved = match current_src {
                Some(src) => Some(src.to_string()),
                None if !state.src.is_empty() => Some(state.src.clone()),
                None => None,
            };
            state.complete = true;
            state.natural_width = width;
            state.natural_height = height;
            state.current_src = resolved;
            (state.on_ready.take(), state.load_listeners.clone())
        };

        log::debug!(
            "Image loaded ({}x{}): {}",
            width,
            height,
            self.current_src().unwrap_or_default()
        );

        if let Some(ready) = ready {
            ready();
        }
        for listener in listeners {
            listener();
        }
    }

    /// Host notification: the image failed to load.
    pub fn fail_load(&self) {
        let listeners = {
            let mut state = self.inner.borrow_mut();
            state.complete = true;
            state.natural_width = 0;
            state.natural_height = 0;
            state.current_src = None;
            state.error_listeners.clone()
        };

        log::debug!("Image failed to load: {}", self.src());

        for listener in listeners {
            listener();
        }
    }
}

impl fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("ImageReference")
            .field("src", &state.src)
            .field("src_set", &state.src_set)
            .field("cross_origin", &state.cross_origin)
            .field("picture", &state.picture)
            .field("complete", &state.complete)
            .field("natural_width", &state.natural_width)
            .field("natural_height", &state.natural_height)
            .field("current_src", &state.current_src)
            .finish()
    }
}

impl FieldSource for ImageReference {
    fn field_value(&self, field: ImageField) -> Option<String> {
        let state = self.inner.borrow();
        match field {
            ImageField::Src => Some(state.src.clone()),
            ImageField::SrcSet => Some(state.src_set.clone()),
            ImageField::CurrentSrc => state.current_src.clone(),
            _ => None,
        }
    }

    fn load_completed(&self) -> bool {
        self.completed()
    }
}

/// References matching the shape of a [`DescriptorSet`].
#[derive(Debug, Clone)]
pub enum ReferenceSet {
    Single(ImageReference),
    Layered(Vec<ImageReference>),
}

impl ReferenceSet {
    pub fn as_single(&self) -> Option<&ImageReference> {
        match self {
            ReferenceSet::Single(reference) => Some(reference),
            ReferenceSet::Layered(_) => None,
        }
    }

    pub fn as_layered(&self) -> Option<&[ImageReference]> {
        match self {
            ReferenceSet::Single(_) => None,
            ReferenceSet::Layered(references) => Some(references),
        }
    }

    /// Reference for layer `index`; a single reference answers for index 0.
    pub fn get(&self, index: usize) -> Option<&ImageReference> {
        match self {
            ReferenceSet::Single(reference) if index == 0 => Some(reference),
            ReferenceSet::Single(_) => None,
            ReferenceSet::Layered(references) => references.get(index),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageReference> {
        let references: &[ImageReference] = match self {
            ReferenceSet::Single(reference) => std::slice::from_ref(reference),
            ReferenceSet::Layered(references) => references,
        };
        references.iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks if a reference really finished loading.
pub fn image_loaded(reference: Option<&ImageReference>) -> bool {
    reference.is_some_and(ImageReference::completed)
}

/// True when every image of the set finished loading.
pub fn reference_completed(references: Option<&ReferenceSet>) -> bool {
    references.is_some_and(|references| references.iter().all(ImageReference::completed))
}

/// Creates image references for `images`, activating them right away when eager.
///
/// Returns `None` without a presentation surface or without images.
pub fn create_reference(
    env: &Environment,
    images: Option<&DescriptorSet>,
    options: &LoadOptions,
    on_ready: Callback,
) -> Option<ReferenceSet> {
    if !env.has_surface {
        log::debug!("No presentation surface, skipping image reference creation");
        return None;
    }

    match images? {
        DescriptorSet::Single(descriptor) => Some(ReferenceSet::Single(create_layer_reference(
            env,
            Some(descriptor),
            options,
            &on_ready,
        ))),
        DescriptorSet::Layered(layers) => Some(ReferenceSet::Layered(
            layers
                .iter()
                .map(|layer| create_layer_reference(env, layer.descriptor(), options, &on_ready))
                .collect(),
        )),
    }
}

fn create_layer_reference(
    env: &Environment,
    descriptor: Option<&ImageDescriptor>,
    options: &LoadOptions,
    on_ready: &Callback,
) -> ImageReference {
    let reference = ImageReference::new();
    {
        let mut state = reference.inner.borrow_mut();
        state.on_ready = Some(Rc::clone(on_ready));
        if let Some(on_load) = &options.on_load {
            state.load_listeners.push(Rc::clone(on_load));
        }
        if let Some(on_error) = &options.on_error {
            state.error_listeners.push(Rc::clone(on_error));
        }
        state.cross_origin = descriptor.and_then(|d| d.cross_origin.clone());
    }

    if options.is_eager() {
        activate_one(env, &reference, descriptor);
    }

    reference
}

/// Assigns sources to previously created references so the host starts loading.
///
/// Returns the same handles, or `None` without a surface, without images, or
/// when the reference and descriptor shapes disagree.
pub fn activate_reference(
    env: &Environment,
    references: &ReferenceSet,
    images: Option<&DescriptorSet>,
) -> Option<ReferenceSet> {
    if !env.has_surface {
        log::debug!("No presentation surface, skipping image reference activation");
        return None;
    }

    match (references, images?) {
        (ReferenceSet::Single(reference), DescriptorSet::Single(descriptor)) => {
            activate_one(env, reference, Some(descriptor));
            Some(ReferenceSet::Single(reference.clone()))
        }
        (ReferenceSet::Layered(references), DescriptorSet::Layered(layers)) => {
            Some(ReferenceSet::Layered(
                references
                    .iter()
                    .enumerate()
                    .map(|(index, reference)| {
                        let descriptor = layers.get(index).and_then(|layer| layer.descriptor());
                        activate_one(env, reference, descriptor);
                        reference.clone()
                    })
                    .collect(),
            ))
        }
        _ => {
            log::warn!("Image reference shape does not match the image descriptors");
            None
        }
    }
}

fn activate_one(
    env: &Environment,
    reference: &ImageReference,
    descriptor: Option<&ImageDescriptor>,
) {
    let mut state = reference.inner.borrow_mut();

    if env.supports_picture {
        let mut picture = Picture::default();
        if let Some(descriptor) = descriptor {
            if let Some(webp) = descriptor.src_set_webp.as_deref().filter(|s| !s.is_empty()) {
                picture.sources.push(PictureSource {
                    mime_type: mime::WEBP.to_string(),
                    src_set: webp.to_string(),
                    sizes: descriptor.sizes.clone().unwrap_or_default(),
                });
            }
        }
        state.picture = Some(picture);
    }

    state.src_set = descriptor
        .and_then(|d| d.src_set.clone())
        .unwrap_or_default();
    state.src = descriptor.map(|d| d.src.clone()).unwrap_or_default();
    state.activated = true;

    log::debug!("Activated image reference: {}", state.src);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ImageLayer;
    use std::cell::Cell;

    fn fixed() -> ImageDescriptor {
        ImageDescriptor::builder()
            .src("test_fixed_image.jpg")
            .src_set("some srcSet")
            .src_set_webp("some srcSetWebp")
            .sizes("(max-width: 600px) 100vw")
            .base64("string_of_base64")
            .build()
    }

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let captured = Rc::clone(&count);
        (count, Rc::new(move || captured.set(captured.get() + 1)))
    }

    #[test]
    fn test_no_images_yields_none() {
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), None, &LoadOptions::default(), ready);
        assert!(created.is_none());
    }

    #[test]
    fn test_no_surface_yields_none() {
        let images: DescriptorSet = fixed().into();
        let options = LoadOptions::builder().critical(true).build();
        let (_, ready) = counter();
        assert!(create_reference(&Environment::server(), Some(&images), &options, ready).is_none());

        let reference = ReferenceSet::Single(ImageReference::new());
        assert!(activate_reference(&Environment::server(), &reference, Some(&images)).is_none());
    }

    #[test]
    fn test_lazy_reference_is_inert() {
        let images: DescriptorSet = fixed().into();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &LoadOptions::default(), ready)
                .unwrap();
        let reference = created.as_single().unwrap();

        assert!(!reference.is_activated());
        assert_eq!(reference.src(), "");
        assert!(reference.picture().is_none());
    }

    #[test]
    fn test_cross_origin_is_applied() {
        let images: DescriptorSet = ImageDescriptor::builder()
            .src("a.jpg")
            .cross_origin("anonymous")
            .build()
            .into();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &LoadOptions::default(), ready)
                .unwrap();
        assert_eq!(created.as_single().unwrap().cross_origin().as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_critical_reference_is_activated() {
        let images: DescriptorSet = fixed().into();
        let options = LoadOptions::builder().critical(true).build();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        let reference = created.as_single().unwrap();

        assert!(reference.is_activated());
        assert_eq!(reference.src(), "test_fixed_image.jpg");
        assert_eq!(reference.src_set(), "some srcSet");

        let picture = reference.picture().unwrap();
        assert_eq!(picture.sources.len(), 1);
        assert_eq!(picture.sources[0].mime_type, "image/webp");
        assert_eq!(picture.sources[0].src_set, "some srcSetWebp");
        assert_eq!(picture.sources[0].sizes, "(max-width: 600px) 100vw");
    }

    #[test]
    fn test_visible_reference_is_activated() {
        let images: DescriptorSet = fixed().into();
        let options = LoadOptions::builder().is_visible(true).build();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        assert!(created.as_single().unwrap().is_activated());
    }

    #[test]
    fn test_missing_sources_become_empty_strings() {
        let images: DescriptorSet = ImageDescriptor::builder().build().into();
        let options = LoadOptions::builder().critical(true).build();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        let reference = created.as_single().unwrap();
        assert_eq!(reference.src(), "");
        assert_eq!(reference.src_set(), "");
        assert!(reference.picture().unwrap().sources.is_empty());
    }

    #[test]
    fn test_legacy_environment_skips_picture() {
        let images: DescriptorSet = fixed().into();
        let reference = ReferenceSet::Single(ImageReference::new());
        let activated =
            activate_reference(&Environment::legacy(), &reference, Some(&images)).unwrap();
        let image = activated.as_single().unwrap();

        assert!(image.picture().is_none());
        assert_eq!(image.src(), "test_fixed_image.jpg");
        assert!(image.ptr_eq(reference.as_single().unwrap()));
    }

    #[test]
    fn test_layered_references_preserve_order() {
        let images = DescriptorSet::layered(vec![
            ImageLayer::from(ImageDescriptor::builder().src("a.jpg").build()),
            ImageLayer::from("rgba(0,0,0,0.5)"),
            ImageLayer::from(ImageDescriptor::builder().src("c.jpg").build()),
        ]);
        let options = LoadOptions::builder().critical(true).build();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        let references = created.as_layered().unwrap();

        assert_eq!(references.len(), 3);
        assert_eq!(references[0].src(), "a.jpg");
        assert_eq!(references[1].src(), "");
        assert_eq!(references[2].src(), "c.jpg");
    }

    #[test]
    fn test_activation_shape_mismatch() {
        let images = DescriptorSet::layered(vec![fixed()]);
        let reference = ReferenceSet::Single(ImageReference::new());
        assert!(activate_reference(&Environment::browser(), &reference, Some(&images)).is_none());
    }

    #[test]
    fn test_ready_fires_exactly_once() {
        let images: DescriptorSet = fixed().into();
        let (loads, on_load) = counter();
        let options = LoadOptions::builder().critical(true).on_load(on_load).build();
        let (ready_count, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        let reference = created.as_single().unwrap();

        // Nothing fires synchronously during creation
        assert_eq!(ready_count.get(), 0);

        reference.finish_load(100, 50, Some("test_fixed_image.webp"));
        reference.finish_load(100, 50, Some("test_fixed_image.webp"));

        assert_eq!(ready_count.get(), 1);
        assert_eq!(loads.get(), 2);
        assert!(reference.completed());
        assert_eq!(reference.current_src().as_deref(), Some("test_fixed_image.webp"));
    }

    #[test]
    fn test_current_src_defaults_to_src() {
        let images: DescriptorSet = fixed().into();
        let options = LoadOptions::builder().critical(true).build();
        let (_, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();
        let reference = created.as_single().unwrap();

        reference.finish_load(10, 10, None);
        assert_eq!(reference.current_src().as_deref(), Some("test_fixed_image.jpg"));
    }

    #[test]
    fn test_broken_image_is_not_completed() {
        let reference = ImageReference::new();
        reference.finish_load(0, 0, Some("broken.jpg"));
        assert!(reference.is_complete());
        assert!(!reference.completed());
        assert!(!image_loaded(Some(&reference)));
    }

    #[test]
    fn test_error_listener() {
        let images: DescriptorSet = fixed().into();
        let (errors, on_error) = counter();
        let options = LoadOptions::builder().critical(true).on_error(on_error).build();
        let (ready_count, ready) = counter();
        let created =
            create_reference(&Environment::browser(), Some(&images), &options, ready).unwrap();

        created.as_single().unwrap().fail_load();
        assert_eq!(errors.get(), 1);
        assert_eq!(ready_count.get(), 0);
        assert!(!reference_completed(Some(&created)));
    }

    #[test]
    fn test_reference_completed_requires_every_image() {
        assert!(!reference_completed(None));
        assert!(!image_loaded(None));

        let first = ImageReference::new();
        let second = ImageReference::new();
        let set = ReferenceSet::Layered(vec![first.clone(), second.clone()]);

        first.finish_load(1, 1, None);
        assert!(!reference_completed(Some(&set)));
        second.finish_load(1, 1, None);
        assert!(reference_completed(Some(&set)));
    }

    #[test]
    fn test_reference_field_source() {
        let reference = ImageReference::new();
        assert!(!reference.load_completed());
        assert_eq!(reference.field_value(ImageField::Base64), None);

        reference.finish_load(2, 2, Some("http://test.webp"));
        assert!(reference.load_completed());
        assert_eq!(
            reference.field_value(ImageField::CurrentSrc).as_deref(),
            Some("http://test.webp")
        );
    }
}
