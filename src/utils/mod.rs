pub mod employee_id_filter;
