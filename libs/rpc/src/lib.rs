// @generated
// Wires up the checked-in protobuf code generated from proto/events/v1/events.proto

pub mod events {
    pub mod v1 {
        include!("generated/events/v1/events.v1.rs");
        include!("generated/events/v1/events.v1.tonic.rs");
    }
}
