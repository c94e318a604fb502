use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use ribbit_bits::{BitDuration, BitMessage, BitParameters, BitResult, RibbitMessage};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

pub static RIBBIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<RibbitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(not(target_arch = "wasm32"))]
pub static BIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<BitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(target_arch = "wasm32")]
fn listen_ribbit_messages() {
    let Some(window) = web_sys::window() else {
        error!("No global `window`, Ribbit messages will be ignored");
        return;
    };
    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let message: Result<RibbitMessage, serde_wasm_bindgen::Error> =
            serde_wasm_bindgen::from_value(event.data());

        let Ok(message) = message else {
            error!("Could not parse ribbit message {:?}", &event.data());
            return;
        };

        RIBBIT_MESSAGE_QUEUE.lock().push(message);
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Err(err) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to add message event listener: {err:?}");
        return;
    }

    // The listener lives as long as the page does.
    closure.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_bit_message(message: BitMessage) {
    debug!("Queueing {message:?}");
    BIT_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_bit_message(message: BitMessage) {
    let Some(window) = web_sys::window() else {
        error!("{message:?} not sent, no global `window`.");
        return;
    };
    let Ok(message_str) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };

    let Ok(Some(parent_window)) = window.parent() else {
        error!("{message:?} not sent, parent_window not found.");
        return;
    };

    if let Err(err) = parent_window.post_message(&message_str, "*") {
        error!("Could not post message {message_str:?}. {err:?}");
    };
}

/// Messages Ribbit can send to a running bit.
///
/// Implemented once per bit. The functions are called by [`RibbitCommunicationPlugin`],
/// never by the bit itself.
pub trait RibbitMessageHandler: Send + Sync + Default + 'static {
    fn duration(world: &mut World) -> BitDuration;
    fn end(world: &mut World) -> BitResult;
    fn restart(world: &mut World);
}

fn process_ribbit_messages<T: RibbitMessageHandler>(world: &mut World) {
    let messages = RIBBIT_MESSAGE_QUEUE.lock().drain(..).collect::<Vec<_>>();

    for message in messages {
        match message {
            RibbitMessage::End => {
                let result = T::end(world);
                send_bit_message(BitMessage::End(result));
            }
            RibbitMessage::Parameters => {
                let duration = T::duration(world);
                let parameters = BitParameters { duration };
                send_bit_message(BitMessage::Parameters(parameters));
            }
            RibbitMessage::Restart => T::restart(world),
            RibbitMessage::Start => debug!("Ribbit started the bit"),
        }
    }
}

fn ready() {
    send_bit_message(BitMessage::Ready);
}

/// Outside the browser there is no Ribbit host, so `R` restarts and `E` ends the bit.
#[cfg(not(target_arch = "wasm32"))]
fn simulate_ribbit_keys(keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::KeyR) {
        RIBBIT_MESSAGE_QUEUE.lock().push(RibbitMessage::Restart);
    }
    if keys.just_pressed(KeyCode::KeyE) {
        RIBBIT_MESSAGE_QUEUE.lock().push(RibbitMessage::End);
    }
}

#[derive(Default)]
pub struct RibbitCommunicationPlugin<T: RibbitMessageHandler>(core::marker::PhantomData<T>);

impl<T: RibbitMessageHandler> Plugin for RibbitCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, process_ribbit_messages::<T>);
        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, listen_ribbit_messages);
        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(PreUpdate, simulate_ribbit_keys);
        app.add_systems(PostStartup, ready);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Restarts(u32);

    #[derive(Default)]
    struct CountingBit;

    impl RibbitMessageHandler for CountingBit {
        fn duration(_world: &mut World) -> BitDuration {
            BitDuration::max_duration()
        }

        fn end(_world: &mut World) -> BitResult {
            BitResult::Failure
        }

        fn restart(world: &mut World) {
            world.resource_mut::<Restarts>().0 += 1;
        }
    }

    #[test]
    fn queued_restart_reaches_the_handler() {
        let mut world = World::new();
        world.init_resource::<Restarts>();

        RIBBIT_MESSAGE_QUEUE.lock().push(RibbitMessage::Restart);
        process_ribbit_messages::<CountingBit>(&mut world);

        assert_eq!(world.resource::<Restarts>().0, 1);
        assert!(RIBBIT_MESSAGE_QUEUE.lock().is_empty());
    }
}
