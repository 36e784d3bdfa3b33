pub mod math {
    pub mod core_number;
    pub mod numeric_pair;
    pub mod rational;
    pub mod traits;
}
pub mod optimisation_algorithms {
    pub mod core_solver;
    pub mod static_matrix;
}
pub mod lar {
    pub mod canonic_left_side;
    pub mod column_info;
    pub mod conversion_helper;
    pub mod lar_constraints;
    pub mod lar_core_problem;
    pub mod lar_evidence;
    pub mod lar_model;
    pub mod lar_printing;
    pub mod lar_settings;
    pub mod lar_solution_signature;
    pub mod lar_solver;
}
pub mod line_reader;
pub mod problem_file;
