
mod policy_walk_tests;
mod posterior_tests;
