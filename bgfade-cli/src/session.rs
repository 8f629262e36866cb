// ABOUTME: Plays the host role for one background by replaying scene events against it
// ABOUTME: Records every composition step and marks fully loaded images in the image cache

use crate::scene::{Scene, SceneEvent};
use bgfade::{
    activate_reference, create_reference, has_changed, initial_background, reference_completed,
    switch_image_settings, BackgroundValue, ComposeInput, DescriptorSet, Environment, ImageCache,
    LoadOptions, LoadPhase, ReferenceSet,
};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// Event label of the step composed right after mounting.
pub const MOUNT_EVENT: &str = "mount";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionStep {
    pub event: String,
    pub has_loaded: bool,
    pub is_visible: bool,
    pub image_state: u32,
    pub after_opacity: u8,
    pub previous_value: String,
    pub next_value: String,
    /// Every image of the scene has been seen loaded
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialReport {
    pub value: BackgroundValue,
    pub css: String,
}

impl InitialReport {
    pub fn for_scene(scene: &Scene, with_padding: bool) -> Self {
        let value = initial_background(scene.images.as_ref(), with_padding);
        Self {
            css: value.css(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub changed: bool,
    pub previous_layers: usize,
    pub next_layers: usize,
}

impl ChangeReport {
    pub fn between(old: &Scene, new: &Scene) -> Self {
        let layers = |scene: &Scene| scene.images.as_ref().map_or(0, DescriptorSet::len);
        Self {
            changed: has_changed(old.image_source().as_ref(), new.image_source().as_ref()),
            previous_layers: layers(old),
            next_layers: layers(new),
        }
    }
}

pub struct BackgroundSession<'a> {
    cache: &'a mut ImageCache,
    env: Environment,
    images: Option<DescriptorSet>,
    references: Option<ReferenceSet>,
    phase: LoadPhase,
    background: BackgroundValue,
    ready: Rc<Cell<u32>>,
    handled_ready: u32,
}

impl<'a> BackgroundSession<'a> {
    /// Mounts the scene: seeds placeholders and creates image references.
    ///
    /// Images already in the cache start out loaded and visible, skipping the fade.
    pub fn new(cache: &'a mut ImageCache, env: Environment, scene: &Scene) -> Self {
        let images = scene.images.clone();
        let cached = cache.is_cached_opt(images.as_ref());
        if cached {
            log::debug!("Scene images already seen, skipping lazy load");
        }

        let phase = LoadPhase {
            has_loaded: cached,
            is_visible: cached || scene.critical || scene.visible,
            image_state: 0,
        };

        let ready = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ready);
        let options = LoadOptions::builder()
            .critical(scene.critical)
            .is_visible(phase.is_visible)
            .build();
        let references = create_reference(
            &env,
            images.as_ref(),
            &options,
            Rc::new(move || counter.set(counter.get() + 1)),
        );

        Self {
            background: initial_background(images.as_ref(), true),
            cache,
            env,
            images,
            references,
            phase,
            ready,
            handled_ready: 0,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn background(&self) -> &BackgroundValue {
        &self.background
    }

    pub fn references(&self) -> Option<&ReferenceSet> {
        self.references.as_ref()
    }

    /// Composes the mount step, then one step per event.
    pub fn run(&mut self, events: &[SceneEvent]) -> Vec<CompositionStep> {
        let mut steps = Vec::with_capacity(events.len() + 1);
        steps.push(self.compose(MOUNT_EVENT.to_string()));
        for event in events {
            steps.push(self.apply(event));
        }
        steps
    }

    /// Delivers one host event and composes the resulting value.
    pub fn apply(&mut self, event: &SceneEvent) -> CompositionStep {
        log::debug!("Applying event: {}", event);

        match event {
            SceneEvent::Show => {
                self.phase.is_visible = true;
                if let Some(references) = &self.references {
                    activate_reference(&self.env, references, self.images.as_ref());
                }
            }
            SceneEvent::Hide => self.phase.is_visible = false,
            SceneEvent::Load(load) => {
                for reference in self.targets(load.layer) {
                    reference.finish_load(load.width, load.height, load.current_src.as_deref());
                }
            }
            SceneEvent::Error => {
                for reference in self.targets(None) {
                    if !reference.is_complete() {
                        reference.fail_load();
                    }
                }
            }
        }

        self.handle_ready();
        self.compose(event.to_string())
    }

    fn targets(&self, layer: Option<usize>) -> Vec<bgfade::ImageReference> {
        let Some(references) = &self.references else {
            log::warn!("No image references in this environment, ignoring load notification");
            return Vec::new();
        };

        let selected: Vec<bgfade::ImageReference> = match layer {
            Some(index) => references.get(index).cloned().into_iter().collect(),
            None => references.iter().cloned().collect(),
        };

        selected
            .into_iter()
            .filter(|reference| {
                let activated = reference.is_activated();
                if !activated {
                    log::warn!("Ignoring notification for an image that was never activated");
                }
                activated
            })
            .collect()
    }

    fn handle_ready(&mut self) {
        let ready = self.ready.get();
        if ready == self.handled_ready {
            return;
        }

        // One image swap per reference that became ready
        self.phase.has_loaded = true;
        self.phase.image_state += ready - self.handled_ready;
        self.handled_ready = ready;

        if reference_completed(self.references.as_ref()) {
            self.cache.mark_cached_opt(self.images.as_ref());
        }
    }

    fn compose(&mut self, event: String) -> CompositionStep {
        let phase = self.phase;
        let cached = self.cache.is_cached_opt(self.images.as_ref());

        let Some(images) = &self.images else {
            return CompositionStep {
                event,
                has_loaded: phase.has_loaded,
                is_visible: phase.is_visible,
                image_state: phase.image_state,
                after_opacity: phase.after_opacity(),
                previous_value: String::new(),
                next_value: String::new(),
                cached,
            };
        };

        let result = switch_image_settings(ComposeInput {
            image: images,
            background: &self.background,
            reference: self.references.as_ref(),
            phase,
        });
        let next_value = result.next_css();
        self.background = result.next_value;

        CompositionStep {
            event,
            has_loaded: phase.has_loaded,
            is_visible: phase.is_visible,
            image_state: phase.image_state,
            after_opacity: result.after_opacity,
            previous_value: result.previous_value,
            next_value,
            cached,
        }
    }
}
