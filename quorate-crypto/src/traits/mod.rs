pub mod dleq_proof;
