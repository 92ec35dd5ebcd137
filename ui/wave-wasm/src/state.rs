//! Page-lifetime singletons. WASM is single-threaded, so `thread_local!`
//! storage is the whole world.

use std::cell::RefCell;
use std::rc::Rc;
use wv_client::WaveClient;

use crate::dom::Elements;
use crate::provider::InjectedProvider;

pub type Client = WaveClient<InjectedProvider>;

thread_local! {
    static CLIENT: RefCell<Option<(Rc<Client>, Elements)>> = const { RefCell::new(None) };
}

pub fn install(client: Rc<Client>, els: Elements) {
    CLIENT.with(|slot| *slot.borrow_mut() = Some((client, els)));
}

pub fn client() -> Option<Rc<Client>> {
    CLIENT.with(|slot| slot.borrow().as_ref().map(|(client, _)| Rc::clone(client)))
}

/// Re-renders the page from the client's current state.
pub fn rerender() {
    CLIENT.with(|slot| {
        if let Some((client, els)) = slot.borrow().as_ref() {
            crate::render::render(els, &client.view());
        }
    });
}
