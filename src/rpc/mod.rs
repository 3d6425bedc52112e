/*!
 * Remote procedure interface.
 *
 * - `protocol`: JSON-RPC 2.0 request/response types
 * - `server`: axum router and server loop mapping `updateContext` and
 *   `translate` onto `SqlTranslator`
 */

pub mod protocol;
pub mod server;

pub use protocol::{RpcMethod, RpcRequest, RpcResponse};
pub use server::{dispatch, router, serve, serve_with_listener};
