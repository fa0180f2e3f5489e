mod bus_tests;
