//! Live `NewWave` feed: polls the installed filter while the page is shown.
//! A back/forward-cache hide pauses polling and the matching `pageshow`
//! resumes it; a real unload removes the filter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::PageTransitionEvent;

use crate::dom::{self, Elements};
use crate::lifecycle::{OnHide, PollLoop};
use crate::render;
use crate::state::Client;

thread_local! {
    static POLL: RefCell<PollLoop> = RefCell::new(PollLoop::default());
    static LIFECYCLE_BOUND: Cell<bool> = const { Cell::new(false) };
}

pub fn start(client: Rc<Client>, els: Elements) {
    if !LIFECYCLE_BOUND.replace(true) {
        bind_page_lifecycle(Rc::clone(&client), els.clone());
    }
    resume(client, els);
}

fn resume(client: Rc<Client>, els: Elements) {
    if !client.is_subscribed() {
        return;
    }
    let Some(ticket) = POLL.with_borrow_mut(PollLoop::start) else {
        return;
    };

    let interval = client.config().poll_interval;
    wasm_bindgen_futures::spawn_local(async move {
        loop {
            gloo_timers::future::sleep(interval).await;
            if !POLL.with_borrow(|poll| poll.is_current(ticket)) {
                break;
            }
            match client.poll_live().await {
                Ok(0) => {}
                Ok(_) => render::render(&els, &client.view()),
                Err(err) => tracing::warn!("NewWave poll failed: {err}"),
            }
        }
    });
}

fn bind_page_lifecycle(client: Rc<Client>, els: Elements) {
    let Ok(window) = dom::window() else {
        return;
    };

    let hide_client = Rc::clone(&client);
    let on_hide = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
        POLL.with_borrow_mut(PollLoop::stop);
        if OnHide::for_page(event.persisted()) == OnHide::Pause {
            return;
        }
        let client = Rc::clone(&hide_client);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = client.unsubscribe().await {
                tracing::warn!("failed to remove NewWave filter: {err}");
            }
        });
    }) as Box<dyn FnMut(_)>);

    let on_show = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
        if !event.persisted() {
            return;
        }
        let client = Rc::clone(&client);
        let els = els.clone();
        wasm_bindgen_futures::spawn_local(async move {
            // No-op when the filter survived the cache.
            if let Err(err) = client.subscribe().await {
                tracing::warn!("failed to reinstall NewWave filter: {err}");
            }
            resume(client, els);
        });
    }) as Box<dyn FnMut(_)>);

    for (name, cb) in [("pagehide", &on_hide), ("pageshow", &on_show)] {
        if let Err(err) = window.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref()) {
            tracing::warn!("failed to bind {name}: {err:?}");
        }
    }
    on_hide.forget();
    on_show.forget();
}
