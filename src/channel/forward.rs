//! Single-channel relay.

use crossbeam_channel::{Receiver, Sender, select};

use crate::tracing_compat::{debug, trace};
use crate::types::DoneSignal;

/// Why a relay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayEnd {
    /// Every sender of the input was dropped and the input was drained.
    InputClosed,
    /// The done signal fired.
    Done,
    /// Every receiver of the output was dropped.
    OutputClosed,
}

/// Copies elements from `input` to `output` in arrival order until `input`
/// closes or `done` fires, then closes `output`.
///
/// Blocks the calling thread; run it on its own thread when the caller needs
/// to keep working. A send blocked on a full or unread `output` is abandoned
/// as soon as `done` fires.
///
/// # Example
///
/// ```
/// use cosync::channel::{bounded, forward};
/// use cosync::types::DoneSignal;
/// use std::thread;
///
/// let done = DoneSignal::new();
/// let (in_tx, in_rx) = bounded(0);
/// let (out_tx, out_rx) = bounded(0);
///
/// let relay = {
///     let done = done.clone();
///     thread::spawn(move || forward(&done, in_rx, out_tx))
/// };
/// thread::spawn(move || {
///     for i in 0..3 {
///         in_tx.send(i).unwrap();
///     }
/// });
/// let got: Vec<i32> = out_rx.iter().collect();
/// assert_eq!(got, vec![0, 1, 2]);
/// relay.join().unwrap();
/// ```
///
/// Mismatched element types do not compile:
///
/// ```compile_fail
/// use cosync::channel::{forward, unbounded};
/// use cosync::types::DoneSignal;
///
/// let (_tx, input) = unbounded::<f32>();
/// let (output, _rx) = unbounded::<i32>();
/// forward(&DoneSignal::new(), input, output);
/// ```
pub fn forward<T: Send>(done: &DoneSignal, input: Receiver<T>, output: Sender<T>) -> RelayEnd {
    let end = relay(done, &input, &output);
    debug!(?end, "forward finished; closing output");
    end
}

/// Relays until one side closes or `done` fires.
///
/// A fired signal takes precedence over pending input: it is checked before
/// every receive, so no element is relayed after the firing is observed.
pub(crate) fn relay<T>(done: &DoneSignal, input: &Receiver<T>, output: &Sender<T>) -> RelayEnd {
    let mut relayed = 0_u64;
    let end = loop {
        if done.is_fired() {
            break RelayEnd::Done;
        }
        let value = select! {
            recv(done.receiver()) -> _ => break RelayEnd::Done,
            recv(input) -> msg => match msg {
                Ok(value) => value,
                Err(_) => break RelayEnd::InputClosed,
            },
        };
        select! {
            send(output, value) -> res => {
                if res.is_err() {
                    break RelayEnd::OutputClosed;
                }
                relayed += 1;
            }
            recv(done.receiver()) -> _ => break RelayEnd::Done,
        }
    };
    trace!(?end, relayed, "relay stopped");
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn closes_output_when_done_fires() {
        let done = DoneSignal::new();
        let (_in_tx, in_rx) = bounded::<i32>(0);
        let (out_tx, out_rx) = bounded::<i32>(0);

        let relay = {
            let done = done.clone();
            thread::spawn(move || forward(&done, in_rx, out_tx))
        };
        done.fire();
        assert!(out_rx.recv().is_err());
        assert_eq!(relay.join().expect("relay panicked"), RelayEnd::Done);
    }

    #[test]
    fn forwards_the_input_in_order() {
        let done = DoneSignal::new();
        let (in_tx, in_rx) = bounded(0);
        let (out_tx, out_rx) = bounded(0);

        let relay = {
            let done = done.clone();
            thread::spawn(move || forward(&done, in_rx, out_tx))
        };
        thread::spawn(move || {
            for i in 0..10 {
                in_tx.send(i).expect("relay alive");
            }
        });
        for i in 0..10 {
            assert_eq!(out_rx.recv().expect("value"), i);
        }

        done.fire();
        assert!(out_rx.recv().is_err());
        let end = relay.join().expect("relay panicked");
        assert!(matches!(end, RelayEnd::InputClosed | RelayEnd::Done));
    }

    #[test]
    fn done_abandons_blocked_send() {
        let done = DoneSignal::new();
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded(0);
        in_tx.send(1).expect("queued");

        let relay = {
            let done = done.clone();
            thread::spawn(move || forward(&done, in_rx, out_tx))
        };
        // Nobody reads out_rx, so the relay is parked on the send.
        thread::sleep(Duration::from_millis(20));
        done.fire();
        assert_eq!(relay.join().expect("relay panicked"), RelayEnd::Done);
        assert!(out_rx.recv().is_err());
    }

    #[test]
    fn stops_when_output_receiver_dropped() {
        let done = DoneSignal::new();
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = bounded::<u8>(0);
        drop(out_rx);
        in_tx.send(1).expect("queued");
        assert_eq!(forward(&done, in_rx, out_tx), RelayEnd::OutputClosed);
    }

    #[test]
    fn fired_signal_beats_ready_input() {
        let done = DoneSignal::new();
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();
        for i in 0..100 {
            in_tx.send(i).expect("queued");
        }
        done.fire();
        assert_eq!(forward(&done, in_rx, out_tx), RelayEnd::Done);
        assert!(out_rx.try_recv().is_err());
    }
}
