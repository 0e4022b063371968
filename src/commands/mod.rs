pub mod setup;

// These modules should not do much and act mostly as a thunk to handle
// displaying outputs/errors of the real function.
