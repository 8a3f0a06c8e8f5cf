/// Request-routing layer: JSON-RPC 2.0 over stdin/stdout
///
/// Thin plumbing around the api operations. Requests arrive one per line
/// on stdin and responses leave one per line on stdout; logging goes to
/// stderr so the two streams never mix.

pub mod protocol;
pub mod server;

pub use server::RpcServer;
