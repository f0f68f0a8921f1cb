//! `wh-sched` — the discrete-event engine that drives robots and cells.
//!
//! # Execution model
//!
//! Single-threaded and cooperative.  Logical processes run one at a time;
//! a process runs until it returns a [`Yield`], and nothing else can run in
//! between.  The only suspension points are the yields.
//!
//! ```text
//! loop:
//!   ① pop the earliest (tick, process) wake — FIFO within a tick
//!   ② now = tick; active = process
//!   ③ process.resume(world, handle) → Yield
//!   ④ park the process on what it yielded:
//!        Sleep(n)   → wake at now + n
//!        Event(c)   → wake at c.at (zero-duration: same tick, queued behind)
//!        Claim(c)   → wake now if granted, else when the resource admits it
//!        Mail(g)    → wake now if fulfilled, else when mail is put
//!        Done       → drop the process
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`scheduler`]   | `Scheduler` / `ResourceView` traits, `Claim`, `Completion`, `MailGet` |
//! | [`handle`]      | `SimHandle` — shared handle implementing the traits     |
//! | [`wake_queue`]  | `WakeQueue` (`BTreeMap<Tick, VecDeque<ProcessId>>`)      |
//! | [`process`]     | `Process` trait, `Yield`                                |
//! | [`sim`]         | `Sim` runner                                            |
//! | [`observer`]    | `SimObserver`, `NoopObserver`                           |
//! | [`error`]       | `SchedError`, `SchedResult<T>`                          |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for claim/get lookup tables.   |

mod engine;
pub mod error;
pub mod handle;
pub mod observer;
pub mod process;
pub mod scheduler;
pub mod sim;
pub mod wake_queue;


pub use error::{SchedError, SchedResult};
pub use handle::SimHandle;
pub use observer::{NoopObserver, SimObserver};
pub use process::{Process, Yield};
pub use scheduler::{Claim, ClaimState, Completion, Mail, MailGet, ResourceView, Scheduler};
pub use sim::Sim;
pub use wake_queue::WakeQueue;
