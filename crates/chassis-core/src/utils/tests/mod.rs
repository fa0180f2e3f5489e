mod fs_tests;
