//! Messages of the disperser v1 protobuf API, generated from `proto/disperser.proto`.

include!(concat!(env!("OUT_DIR"), "/disperser.rs"));

// Wraps a payload into its oneof envelope.
macro_rules! impl_from_for_message {
    ($message:ident, $module:ident, $($type:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$type> for $message {
                fn from(msg: $type) -> Self {
                    $message {
                        payload: Some($module::Payload::$variant(msg)),
                    }
                }
            }
        )+
    }
}

impl_from_for_message!(
    AuthenticatedRequest,
    authenticated_request,
    DisperseBlobRequest => DisperseRequest,
    AuthenticationData => AuthenticationData,
);

impl_from_for_message!(
    AuthenticatedReply,
    authenticated_reply,
    BlobAuthHeader => BlobAuthHeader,
    DisperseBlobReply => DisperseReply,
);
