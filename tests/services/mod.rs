mod auth_tests;
mod economy_tests;
mod shop_tests;
mod thread_tests;
mod wallet_tests;
