//! Domain-level command types.
//!
//! These structs are the inputs services accept inside the domain layer and
//! are **not** exposed over the public API. The REST layer maps the public
//! DTOs defined in the `shared` crate to these internal types.

pub mod elder {
    use shared::Gender;

    /// Input for registering a new elder.
    #[derive(Debug, Clone)]
    pub struct RegisterElderCommand {
        pub name: String,
        pub age: u32,
        pub gender: Gender,
    }
}

pub mod medication {
    /// Input for assigning a medication to an elder.
    #[derive(Debug, Clone)]
    pub struct AddMedicationCommand {
        pub elder_id: String,
        pub name: String,
        pub dosage: String,
        pub frequency: String,
    }
}
