//! Socket collaborator (spec §6): IPv4-only TCP/UDP wrappers over
//! `std::net`, plus asynchronous name lookup. Every asynchronous operation
//! follows the same shape the timer worker (C7) already established: spawn
//! a detached worker thread, do the blocking host call there, and post a
//! completion event back to the creator.

pub mod resolve;
pub mod tcp;
pub mod udp;
