pub mod admin;
pub mod department;
pub mod employee;
pub mod leave_request;
pub mod principal;
pub mod role;
pub mod salary;
