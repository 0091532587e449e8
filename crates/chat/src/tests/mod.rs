mod chat_log_tests;
