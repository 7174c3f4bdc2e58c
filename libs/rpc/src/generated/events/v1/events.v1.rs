// @generated
// This file is @generated by prost-build.
/// A pending scheduled event. `time` is a Unix timestamp in seconds.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Event {
    #[prost(int64, tag = "1")]
    pub event_id: i64,
    #[prost(int64, tag = "2")]
    pub sender_id: i64,
    #[prost(int64, tag = "3")]
    pub time: i64,
    #[prost(string, tag = "4")]
    pub name: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GreetSenderRequest {
    /// 0 asks the server to issue a fresh sender id.
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GreetSenderResponse {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct MakeEventRequest {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
    #[prost(int64, tag = "2")]
    pub time: i64,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct MakeEventResponse {
    #[prost(int64, tag = "1")]
    pub event_id: i64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetEventRequest {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
    #[prost(int64, tag = "2")]
    pub event_id: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetEventResponse {
    #[prost(message, optional, tag = "1")]
    pub event: ::core::option::Option<Event>,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DeleteEventRequest {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
    #[prost(int64, tag = "2")]
    pub event_id: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DeleteEventResponse {
    #[prost(string, tag = "1")]
    pub delete_response: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetEventsRequest {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
    /// Exclusive lower bound.
    #[prost(int64, tag = "2")]
    pub from_time: i64,
    /// Exclusive upper bound.
    #[prost(int64, tag = "3")]
    pub to_time: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetEventsResponse {
    #[prost(message, optional, tag = "1")]
    pub event: ::core::option::Option<Event>,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ExitRequest {
    #[prost(int64, tag = "1")]
    pub sender_id: i64,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ExitResponse {
    #[prost(string, tag = "1")]
    pub goodbye: ::prost::alloc::string::String,
}
