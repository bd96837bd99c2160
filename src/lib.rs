/*!

fabricsim: a cycle-accurate discrete-event simulation core for interconnection networks.
Concrete topologies, routing algorithms, traffic patterns and result-file writers are external
collaborators that plug into the interfaces defined here; this crate owns the event scheduler,
the flit/packet/message data hierarchy, credit-based flow control, the separable allocator, the
router datapath, and the workload lifecycle that ties them together.

*/

pub mod error;
pub mod config_parser;
pub mod quantify;
pub mod matrix;
pub mod event;
pub mod clock;
pub mod packet;
pub mod congestion;
pub mod allocator;
pub mod routing;
pub mod router;
pub mod channel;
pub mod injection;
pub mod interface;
pub mod workload;
pub mod topology;
pub mod measures;
pub mod plugs;

pub use error::Error;
pub use config_parser::ConfigurationValue;
pub use event::{Scheduler,Eventful,Event,EventGeneration,Time};
pub use packet::{Flit,Packet,Message,Transaction};
pub use quantify::Quantifiable;
