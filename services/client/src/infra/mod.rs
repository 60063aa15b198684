pub mod firebase_auth;
pub mod firestore;
pub mod firestore_value;
